use std::env;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "TCSYNC_DEBUG_LOG";

/// Install the stderr subscriber. A truthy `TCSYNC_DEBUG_LOG` forces debug
/// output, otherwise `RUST_LOG` applies with `warn` as the default.
pub fn init() {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| is_truthy(&value))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    ["1", "true", "yes", "on"]
        .iter()
        .any(|accepted| value.eq_ignore_ascii_case(accepted))
}
