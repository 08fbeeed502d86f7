//! # ForkLab Telemetry
//!
//! Structured logging for the ForkLab workspace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use forklab_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::for_subsystem("02", "block-miner");
//!     init_logging(&config).expect("logging already initialized");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `forklab` | Service name in log lines |
//! | `FL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `FL_JSON_LOGS` | `false` (`true` in containers) | JSON formatted output |
//! | `FL_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `FL_SUBSYSTEM_ID` | `00` | Subsystem identifier |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, try_init_for_tests};

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),

    /// The log level directive could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience macro for creating a span with subsystem context.
///
/// # Example
///
/// ```rust,ignore
/// use forklab_telemetry::subsystem_span;
///
/// fn service_request() {
///     let _span = subsystem_span!("build_block", subsystem = "fl-02", block_number = 12345);
/// }
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        $crate::tracing::info_span!($name, $($field)*)
    };
}
