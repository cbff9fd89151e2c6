use crate::config::Config;
use crate::tracker::TrackerView;
use anyhow::{Context, Result};
use tracing::info;

/// Keep the tracker label live until Ctrl-C.
pub async fn watch(config: &Config) -> Result<()> {
    let controller = super::controller(config)?;
    let handle = controller
        .initialize()
        .await
        .context("Failed to start sync")?;

    let mut state_rx = controller.store().subscribe();
    let mut view = TrackerView::new(config.sync.clock_tick());
    let mut clock_rx = view.clock_updates();
    let mut last_printed = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let state = state_rx.borrow_and_update().clone();
        view.sync(&state);
        let _ = clock_rx.borrow_and_update();

        let label = view.label(&state);
        if last_printed.as_ref() != Some(&label) {
            println!("{}", label);
            last_printed = Some(label);
        }

        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = clock_rx.changed() => {}
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
