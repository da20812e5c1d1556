use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set and non-empty.
pub fn init(config: &Config) {
    let default_directive = format!("solar_epc_manager={},sqlx=warn", config.log_level);
    let directive = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr);

    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    // a subscriber may already be installed, e.g. by an earlier call in the same process
    if let Err(err) = installed {
        tracing::debug!(%err, "tracing subscriber already set");
    }
}
