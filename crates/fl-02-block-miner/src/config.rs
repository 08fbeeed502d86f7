//! Configuration types for the block miner

use crate::error::{MinerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

/// Default block period when `args.interval` is absent or invalid
pub const DEFAULT_BUILD_PERIOD: Duration = Duration::from_secs(12);

/// Idle window after the last submission before a batch build fires
pub const BATCH_WINDOW: Duration = Duration::from_millis(100);

/// Upper bound between the first coalesced submission and its batch build
pub const BATCH_MAX_WAIT: Duration = Duration::from_millis(1000);

/// Prefix of miner keys in a flat, CLI-style argument list
pub const ARG_PREFIX: &str = "miner-";

/// Key of the block period in `MinerConfig::args`
pub const INTERVAL_ARG: &str = "interval";

/// When blocks get built.
///
/// Carried on the wire as its integer code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MinerMode {
    /// Coalesce bursts of submissions into one block
    #[default]
    Batch = 0,
    /// One block per submission
    Instant = 1,
    /// Only on explicit request
    Manual = 2,
    /// On a fixed timer
    Period = 3,
}

impl MinerMode {
    /// Integer code of this mode.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse a mode from a JSON number or a numeric string.
    pub fn from_value(value: &Value) -> Result<Self> {
        let code = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        code.and_then(|c| u8::try_from(c).ok())
            .ok_or_else(|| MinerError::InvalidConfig(format!("invalid miner mode: {value}")))
            .and_then(Self::try_from)
    }
}

impl TryFrom<u8> for MinerMode {
    type Error = MinerError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Batch),
            1 => Ok(Self::Instant),
            2 => Ok(Self::Manual),
            3 => Ok(Self::Period),
            other => Err(MinerError::InvalidConfig(format!(
                "unknown miner mode {other}"
            ))),
        }
    }
}

impl From<MinerMode> for u8 {
    fn from(mode: MinerMode) -> Self {
        mode.code()
    }
}

/// Miner mode plus its free-form arguments.
///
/// Only `interval` is interpreted; other keys are kept as given.
///
/// ```json
/// { "mode": 3, "args": { "interval": 5 } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Operating mode
    pub mode: MinerMode,

    /// Mode arguments
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl MinerConfig {
    /// Config for `mode` with no arguments.
    pub fn new(mode: MinerMode) -> Self {
        Self {
            mode,
            args: Map::new(),
        }
    }

    /// `Period` mode with the given interval in seconds.
    pub fn period(interval: impl Into<Value>) -> Self {
        Self::new(MinerMode::Period).with_arg(INTERVAL_ARG, interval)
    }

    /// Set an argument.
    pub fn with_arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }

    /// Build a config from flat key/value pairs.
    ///
    /// With `has_prefix`, keys without the `miner-` prefix are skipped and
    /// the prefix is stripped from the rest. `mode` takes an integer code;
    /// every other key lands in `args`. Without a `mode` key the miner is
    /// `Manual`: command-line nodes only build when asked.
    pub fn from_args<I, K, V>(args: I, has_prefix: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut config = Self::new(MinerMode::Manual);
        for (key, value) in args {
            let key = key.as_ref();
            let key = if has_prefix {
                match key.strip_prefix(ARG_PREFIX) {
                    Some(stripped) => stripped,
                    None => continue,
                }
            } else {
                key
            };

            let value = value.into();
            if key == "mode" {
                config.mode = MinerMode::from_value(&value)?;
            } else {
                config.args.insert(key.to_string(), value);
            }
        }
        Ok(config)
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FL_MINER_MODE`: mode code 0..3 (default: 0, Batch)
    /// - `FL_MINER_INTERVAL`: block period in seconds for Period mode
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// An unparseable mode is logged and replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup("FL_MINER_MODE") {
            match MinerMode::from_value(&Value::String(raw.clone())) {
                Ok(mode) => config.mode = mode,
                Err(e) => warn!("[fl-02] Ignoring FL_MINER_MODE={}: {}", raw, e),
            }
        }
        if let Some(interval) = lookup("FL_MINER_INTERVAL") {
            config
                .args
                .insert(INTERVAL_ARG.to_string(), Value::String(interval));
        }
        config
    }

    /// The block period for `Period` mode.
    ///
    /// Accepts a number or numeric string of seconds, fractions included.
    /// Anything missing, non-finite or not strictly positive yields
    /// [`DEFAULT_BUILD_PERIOD`].
    pub fn build_interval(&self) -> Duration {
        self.args
            .get(INTERVAL_ARG)
            .and_then(parse_interval)
            .unwrap_or(DEFAULT_BUILD_PERIOD)
    }
}

fn parse_interval(value: &Value) -> Option<Duration> {
    let secs = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
}
