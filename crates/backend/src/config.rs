//! Transport configuration for the FAR RAG backend.
//!
//! Two authentication paths exist:
//! - **direct**: a key issued by the FAR RAG service itself (`/v1/register`),
//!   sent as `X-API-Key` against the service's own host
//! - **gateway**: a RapidAPI marketplace key, sent as `X-RapidAPI-Key` +
//!   `X-RapidAPI-Host` against the marketplace-controlled host
//!
//! Credentials and host overrides come from the process environment, but only
//! [`CredentialEnv::capture`] touches it; everything downstream receives an
//! explicit [`BackendConfig`] so tests never mutate process state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Direct-mode credential variable.
pub const DIRECT_API_KEY_VAR: &str = "FAR_API_KEY";
/// Gateway-mode (RapidAPI) credential variable.
pub const GATEWAY_API_KEY_VAR: &str = "RAPIDAPI_KEY";
/// Direct base URL override variable.
pub const DIRECT_BASE_URL_VAR: &str = "FAR_API_URL";
/// Gateway host override variable.
pub const GATEWAY_HOST_VAR: &str = "RAPIDAPI_HOST";

/// Production host for direct access.
pub const DEFAULT_DIRECT_BASE_URL: &str = "https://far-rag-api-production.up.railway.app";
/// Production RapidAPI listing host.
pub const DEFAULT_GATEWAY_HOST: &str =
    "far-rag-federal-acquisition-regulation-search.p.rapidapi.com";

/// Default bound on a single search round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which authentication path a request travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Direct,
    Gateway,
}

/// Host + header scheme for one transport mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Direct { base_url: String },
    Gateway { host: String },
}

/// Everything the query client needs for one call.
///
/// Immutable once built; build a fresh one per invocation so host overrides
/// are re-read from the environment each time.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub transport: Transport,
    pub api_key: String,
    pub timeout: Duration,
}

impl BackendConfig {
    #[must_use]
    pub fn direct(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            transport: Transport::Direct {
                base_url: base_url.into(),
            },
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn gateway(api_key: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            transport: Transport::Gateway { host: host.into() },
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn mode(&self) -> TransportMode {
        match self.transport {
            Transport::Direct { .. } => TransportMode::Direct,
            Transport::Gateway { .. } => TransportMode::Gateway,
        }
    }

    /// Scheme + host the `/search` path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.transport {
            Transport::Direct { base_url } => base_url.clone(),
            Transport::Gateway { host } => format!("https://{host}"),
        }
    }
}

/// Snapshot of the environment variables this crate cares about.
///
/// Captured at call time (never cached across calls) so credential rotation
/// and host overrides take effect without a restart.
#[derive(Debug, Clone, Default)]
pub struct CredentialEnv {
    pub far_api_key: Option<String>,
    pub rapidapi_key: Option<String>,
    pub direct_base_url: Option<String>,
    pub gateway_host: Option<String>,
}

impl CredentialEnv {
    /// Read the current process environment. Empty values count as unset.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            far_api_key: env_nonempty(DIRECT_API_KEY_VAR),
            rapidapi_key: env_nonempty(GATEWAY_API_KEY_VAR),
            direct_base_url: env_nonempty(DIRECT_BASE_URL_VAR),
            gateway_host: env_nonempty(GATEWAY_HOST_VAR),
        }
    }

    /// Credential policy: a direct key always wins; a gateway key is the
    /// fallback; neither means no config (and the caller must not touch the
    /// network).
    #[must_use]
    pub fn resolve(&self) -> Option<BackendConfig> {
        if let Some(key) = self.far_api_key.as_deref() {
            let base_url = self
                .direct_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_DIRECT_BASE_URL.to_string());
            return Some(BackendConfig::direct(key, base_url));
        }

        if let Some(key) = self.rapidapi_key.as_deref() {
            let host = self
                .gateway_host
                .clone()
                .unwrap_or_else(|| DEFAULT_GATEWAY_HOST.to_string());
            return Some(BackendConfig::gateway(key, host));
        }

        None
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
