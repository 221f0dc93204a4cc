use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the stderr subscriber once per process.
///
/// `RUST_LOG` wins when set. Otherwise `--verbose`/`--quiet` pick the level,
/// falling back to `FNKIT_LOG` and then `warn`.
pub fn init(verbose: bool, quiet: bool) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if quiet {
            Level::ERROR
        } else if verbose {
            Level::DEBUG
        } else {
            env::var("FNKIT_LOG")
                .ok()
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(Level::WARN)
        };

        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!(
                "fnkit={},reqwest=warn,hyper=warn",
                level.as_str().to_ascii_lowercase()
            ))
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init();
    });
}
