//! Dispatcher configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What to do when a notification arrives while another is in flight,
/// typically because a processor edited the surface from inside a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReentrancyPolicy {
    /// Fail the nested notification without running any hook.
    #[default]
    Reject,
    /// Dispatch the nested notification with a freshly resolved eligible set.
    Allow,
}

impl std::str::FromStr for ReentrancyPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "allow" => Ok(Self::Allow),
            _ => Err(()),
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub reentrancy: ReentrancyPolicy,
    /// Maximum nesting of notifications under [`ReentrancyPolicy::Allow`],
    /// counting the outermost one.
    pub max_depth: usize,
}

impl DispatcherConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 8;

    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `WEFT_REENTRANCY`: `reject` or `allow` (default: reject)
    /// - `WEFT_MAX_DISPATCH_DEPTH`: positive integer (default: 8)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("WEFT_REENTRANCY") {
            config.reentrancy = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "WEFT_REENTRANCY",
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup("WEFT_MAX_DISPATCH_DEPTH") {
            config.max_depth = match value.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => depth,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "WEFT_MAX_DISPATCH_DEPTH",
                        value,
                    });
                }
            };
        }

        Ok(config)
    }

    pub fn with_reentrancy(mut self, reentrancy: ReentrancyPolicy) -> Self {
        self.reentrancy = reentrancy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            reentrancy: ReentrancyPolicy::Reject,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
