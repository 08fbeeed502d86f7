//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Subsystem identifier (01 pool, 02 miner, 00 for the whole node)
    pub subsystem_id: String,

    /// Log level filter directive (trace, debug, info, warn, error, or an EnvFilter string)
    pub log_level: String,

    /// Whether to write logs to the console at all
    pub console_output: bool,

    /// Whether to format logs as JSON
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "forklab".to_string(),
            subsystem_id: "00".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: forklab)
    /// - `FL_SUBSYSTEM_ID`: Subsystem ID (default: 00)
    /// - `FL_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `FL_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `FL_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or_else(|| "forklab".to_string()),

            subsystem_id: lookup("FL_SUBSYSTEM_ID").unwrap_or_else(|| "00".to_string()),

            log_level: lookup("FL_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("FL_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("FL_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    /// Create configuration for a specific subsystem.
    pub fn for_subsystem(subsystem_id: &str, subsystem_name: &str) -> Self {
        let mut config = Self::from_env();
        config.subsystem_id = subsystem_id.to_string();
        config.service_name = format!("fl-{}-{}", subsystem_id, subsystem_name);
        config
    }

    /// Get the full service name including subsystem.
    pub fn full_service_name(&self) -> String {
        if self.subsystem_id == "00" {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.subsystem_id)
        }
    }
}
