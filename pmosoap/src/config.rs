//! Client configuration.
//!
//! ```
//! use pmosoap::SoapConfig;
//!
//! let config = SoapConfig::from_yaml_str("timeout_ms: 1500\ndebug: true\n").unwrap();
//! assert_eq!(config.timeout(), std::time::Duration::from_millis(1500));
//! assert_eq!(config.user_agent, "pmosoap/0.1");
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SoapClientError};

const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_USER_AGENT: &str = "pmosoap/0.1";

/// Settings shared by the transport and every operation of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapConfig {
    /// Network timeout for one request/response round trip, in milliseconds.
    /// Must be positive.
    pub timeout_ms: u64,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Log raw request and response bytes.
    pub debug: bool,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            debug: false,
        }
    }
}

impl SoapConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| SoapClientError::Config(e.to_string()))?;
        if config.timeout_ms == 0 {
            return Err(SoapClientError::Config(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SoapClientError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Set the network timeout, rounded up to the next millisecond (at least 1 ms).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000).max(1);
        self.timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}
