//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human-readable or a JSON `fmt` layer. JSON lines carry:
//! - `timestamp`, `level`, `target`
//! - `subsystem`: set by the `log_event!` family of macros
//! - any structured fields given at the call site

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the level filter for a configuration.
///
/// `RUST_LOG` wins when it is set and valid, matching `EnvFilter` conventions.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))
}

/// Install the global subscriber.
///
/// Fails with [`TelemetryError::AlreadyInitialized`] if a global subscriber
/// is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let result = if !config.console_output {
        tracing_subscriber::registry().with(filter).try_init()
    } else if config.json_logs {
        // JSON output for containers
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
    } else {
        // Pretty output for development
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    };

    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.full_service_name(),
        json = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Install a test-friendly subscriber writing through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn try_init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    // Info level with subsystem
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Warn level with subsystem
    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Error level with subsystem
    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    // Debug level with subsystem
    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        $crate::tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a block-related event with standard fields.
#[macro_export]
macro_rules! log_block_event {
    ($level:ident, $subsystem:expr, $msg:expr, $block_number:expr, $block_hash:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            subsystem = $subsystem,
            block_number = $block_number,
            block_hash = ?$block_hash,
            $($($field)*,)?
            $msg
        )
    };
}
