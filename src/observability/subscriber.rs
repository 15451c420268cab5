//! Process-wide subscriber setup for binaries.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Verbosity selected by the entry point, e.g. from `--verbose/--quiet/--silent`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Verbose,
    #[default]
    Normal,
    Quiet,
    Silent,
}

impl LogLevel {
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Verbose => "debug",
            LogLevel::Normal => "info",
            LogLevel::Quiet => "warn",
            LogLevel::Silent => "off",
        }
    }
}

/// Installs a `fmt` subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: LogLevel) -> crate::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(level == LogLevel::Verbose)
        .with_thread_ids(false)
        .with_file(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| crate::Error::Config(format!("Failed to init subscriber: {}", e)))
}
