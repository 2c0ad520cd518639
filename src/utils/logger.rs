use tracing_subscriber::{EnvFilter, fmt};

pub struct LoggerUtils {}

impl LoggerUtils {
    /// Installs the global subscriber. `RUST_LOG` wins over the default level.
    pub fn init(verbose: bool) {
        let default_level = if verbose { "readmit=debug" } else { "readmit=info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{default_level}")));

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .compact()
            .init();
    }
}
