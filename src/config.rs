//! Runtime configuration for the ledger service.

use crate::error::Result;
use ::config::{Config, Environment, Map};
use serde::Deserialize;
use std::time::Duration;

/// Prefix for ledger environment variables, e.g. `POINT_LEDGER_LOCK_TIMEOUT_MS`.
pub const ENV_PREFIX: &str = "POINT_LEDGER";

/// Environment variable holding the lock acquisition timeout in milliseconds.
pub const LOCK_TIMEOUT_ENV: &str = "POINT_LEDGER_LOCK_TIMEOUT_MS";

/// Settings as they appear in the environment, before unit conversion.
#[derive(Debug, Default, Deserialize)]
struct LedgerSettings {
    #[serde(default)]
    lock_timeout_ms: Option<u64>,
}

/// Tunables for [`LedgerService`](crate::service::LedgerService).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Maximum wait for a user's lock. `None` waits indefinitely.
    pub lock_timeout: Option<Duration>,
}

impl LedgerConfig {
    /// Sets the lock acquisition timeout.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Reads configuration from an explicit set of `POINT_LEDGER_*` variables
    /// instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(Some(source))
    }

    fn load(source: Option<Map<String, String>>) -> Result<Self> {
        let settings: LedgerSettings = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .ignore_empty(true)
                    .source(source),
            )
            .build()?
            .try_deserialize()?;

        Ok(LedgerConfig {
            lock_timeout: settings.lock_timeout_ms.map(Duration::from_millis),
        })
    }
}
