use tracing::warn;

use crate::error::{MatmulError, Result};

/// Default upper bound (inclusive) on m, n and k for the naive kernel.
pub const DEFAULT_TINY: usize = 32;
/// Default bound for the reserved second tier.
pub const DEFAULT_SMALL: usize = 128;

/// Environment variable overriding [`DispatchConfig::tiny`].
pub const TINY_ENV: &str = "MM_TINY_THRESHOLD";
/// Environment variable overriding [`DispatchConfig::small`].
pub const SMALL_ENV: &str = "MM_SMALL_THRESHOLD";

/// Kernel selection thresholds for [`crate::MatmulDispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// A multiply runs on the naive kernel when m, n and k are all `<= tiny`.
    pub tiny: usize,
    /// Reserved for a mid-size tier between the naive kernel and BLAS. It is
    /// validated but does not affect selection yet.
    pub small: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tiny: DEFAULT_TINY,
            small: DEFAULT_SMALL,
        }
    }
}

impl DispatchConfig {
    /// Set the naive-kernel threshold.
    pub fn with_tiny(mut self, tiny: usize) -> Self {
        self.tiny = tiny;
        self
    }

    /// Set the reserved second-tier threshold.
    pub fn with_small(mut self, small: usize) -> Self {
        self.small = small;
        self
    }

    /// Checks that the tiers are ordered (`small >= tiny`).
    pub fn validate(&self) -> Result<()> {
        if self.small < self.tiny {
            return Err(MatmulError::InvalidConfig(format!(
                "small threshold {} is below tiny threshold {}",
                self.small, self.tiny
            )));
        }
        Ok(())
    }

    /// Build a config from `MM_TINY_THRESHOLD` / `MM_SMALL_THRESHOLD`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup(TINY_ENV) {
            config.tiny = parse_threshold(TINY_ENV, &v)?;
        }
        if let Some(v) = lookup(SMALL_ENV) {
            config.small = parse_threshold(SMALL_ENV, &v)?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_threshold(key: &str, value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|e| {
        warn!(key, value, "rejecting dispatch threshold");
        MatmulError::InvalidConfig(format!("{key}={value:?}: {e}"))
    })
}
