//! ISM configuration from environment variables.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QC_ISM_AUTHORIZED_HOOK` | (none) | Hook address, hex, 20 or 32 bytes |
//! | `QC_ISM_ORIGIN_DOMAIN` | `0` | Expected origin domain, `0` = any |
//! | `QC_ISM_LOCAL_DOMAIN` | `0` | This domain, `0` = any |
//! | `QC_ISM_BRIDGE_SLOW_CALL_SECS` | `30` | Warn when an outbox call takes longer |

use crate::domain::{CanonicalAddress, Domain};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Hook is missing or not a 20/32-byte hex address.
    #[error("Invalid authorized hook: {0:?}")]
    InvalidHook(String),

    /// Zero hook would authorize nobody (or everybody on some bridges).
    #[error("Authorized hook is the zero address")]
    ZeroHook,

    /// A zero threshold would flag every bridge call as slow.
    #[error("Bridge slow-call threshold must be non-zero")]
    ZeroSlowCall,
}

/// Interchain security configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsmConfig {
    /// Authorized hook on the origin domain, hex.
    pub authorized_hook: String,
    /// Origin domain messages must come from (`0` disables the check).
    pub origin_domain: Domain,
    /// Domain this module guards (`0` disables the check).
    pub local_domain: Domain,
    /// Outbox calls running longer than this are logged; they are never
    /// abandoned.
    pub bridge_slow_call_secs: u64,
}

impl Default for IsmConfig {
    fn default() -> Self {
        Self {
            authorized_hook: String::new(),
            origin_domain: 0,
            local_domain: 0,
            bridge_slow_call_secs: 30,
        }
    }
}

impl IsmConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            authorized_hook: env::var("QC_ISM_AUTHORIZED_HOOK").unwrap_or_default(),
            origin_domain: env::var("QC_ISM_ORIGIN_DOMAIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.origin_domain),
            local_domain: env::var("QC_ISM_LOCAL_DOMAIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.local_domain),
            bridge_slow_call_secs: env::var("QC_ISM_BRIDGE_SLOW_CALL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bridge_slow_call_secs),
        }
    }

    /// Config for a hook with everything else defaulted.
    pub fn for_hook(hook: CanonicalAddress) -> Self {
        Self {
            authorized_hook: hook.to_string(),
            ..Self::default()
        }
    }

    /// Parsed hook address.
    pub fn hook(&self) -> Result<CanonicalAddress, ConfigError> {
        let hook = CanonicalAddress::from_hex(&self.authorized_hook)
            .ok_or_else(|| ConfigError::InvalidHook(self.authorized_hook.clone()))?;
        if hook.is_zero() {
            return Err(ConfigError::ZeroHook);
        }
        Ok(hook)
    }

    /// Slow bridge call threshold.
    pub fn bridge_slow_call(&self) -> Duration {
        Duration::from_secs(self.bridge_slow_call_secs)
    }

    /// Validate before constructing a module.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hook()?;
        if self.bridge_slow_call_secs == 0 {
            return Err(ConfigError::ZeroSlowCall);
        }
        Ok(())
    }
}
