use std::sync::Once;

use env_logger::WriteStyle;

/// Where the logger takes its filter from, and whether it colours output.
///
/// Filters use the `env_logger` syntax, e.g. `"palette_ui=debug,palette_engine=trace"`.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Takes precedence over `RUST_LOG` when set.
    pub filter: Option<String>,
    pub color: WriteStyle,
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self { filter: Some(filter.into()), ..Self::default() }
    }

    /// The explicit filter, else `env` (the value of `RUST_LOG`), else `info`.
    /// Animation frames log at `trace`, so the fallback keeps them quiet.
    pub fn resolved_filter(&self, env: Option<String>) -> String {
        self.filter
            .clone()
            .or(env)
            .unwrap_or_else(|| "info".to_owned())
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger. Only the first call has any
/// effect, and a logger installed by someone else is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolved_filter(std::env::var("RUST_LOG").ok());
        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.color)
            .try_init();
        match installed {
            Ok(()) => log::debug!("logging initialized with '{filter}'"),
            Err(err) => log::debug!("keeping existing logger: {err}"),
        }
    });
}
