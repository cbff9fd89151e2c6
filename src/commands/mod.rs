pub mod auth;
pub mod config;
pub mod session;
pub mod watch;

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::sync::SyncController;
use anyhow::Result;
use std::sync::Arc;

/// Build the HTTP backend described by `config`.
pub fn connect(config: &Config) -> Result<HttpBackend> {
    if config.backend.base_url.is_empty() {
        anyhow::bail!("backend.base_url not set. Add it to the [backend] section of config.toml");
    }
    let token = config.backend_token()?;

    Ok(HttpBackend::new(&config.backend.base_url, &token)
        .with_timeout(config.backend.request_timeout())
        .with_session_ended_event(&config.sync.session_ended_event))
}

pub fn controller(config: &Config) -> Result<SyncController<HttpBackend>> {
    let backend = connect(config)?;
    Ok(
        SyncController::new(Arc::new(backend), config.sync.poll_interval())
            .with_resubscribe_delay(config.sync.resubscribe_delay()),
    )
}
