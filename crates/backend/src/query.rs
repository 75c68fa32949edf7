//! One-shot query execution against the FAR RAG `/search` endpoint.
//!
//! [`FarQueryClient::search`] performs exactly one outbound POST and never
//! returns an error: every failure class is absorbed into a
//! [`QueryOutcome`]. Construction is the only fallible step (bad base URL,
//! client build failure).

use crate::config::{BackendConfig, Transport};
use crate::outcome::{QUOTA_FALLBACK, QueryOutcome};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Fixed resource under the transport's base URL.
pub const SEARCH_PATH: &str = "/search";

/// Bounds the server accepts for `top_k`; anything outside is clamped.
pub const TOP_K_MIN: i64 = 1;
pub const TOP_K_MAX: i64 = 20;

/// Direct-mode credential header.
pub const DIRECT_KEY_HEADER: &str = "X-API-Key";
/// Gateway-mode credential header.
pub const GATEWAY_KEY_HEADER: &str = "X-RapidAPI-Key";
/// Gateway-mode host header.
pub const GATEWAY_HOST_HEADER: &str = "X-RapidAPI-Host";

#[derive(Debug, Error)]
pub enum QueryClientError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    BuildClient(String),
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: u32,
}

/// Client for one transport configuration.
///
/// Cheap to build per invocation; holds no state beyond the reqwest
/// connection pool, so concurrent calls need no coordination.
pub struct FarQueryClient {
    client: Client,
    config: BackendConfig,
}

impl FarQueryClient {
    /// # Errors
    ///
    /// Returns an error if the configured base URL does not parse or the
    /// underlying HTTP client cannot be constructed.
    pub fn new(config: BackendConfig) -> Result<Self, QueryClientError> {
        let base_url = config.base_url();
        Url::parse(&base_url).map_err(|source| QueryClientError::InvalidBaseUrl {
            url: base_url,
            source,
        })?;

        let client = Client::builder()
            .build()
            .map_err(|e| QueryClientError::BuildClient(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Issue one search and classify whatever comes back.
    pub async fn search(&self, query: &str, top_k: i64) -> QueryOutcome {
        let top_k = clamp_top_k(top_k);
        let url = format!("{}{SEARCH_PATH}", self.config.base_url());
        debug!(mode = ?self.config.mode(), top_k, "querying FAR backend");

        let mut request = self
            .client
            .post(&url)
            .timeout(self.config.timeout)
            .json(&SearchRequest { query, top_k });

        request = match &self.config.transport {
            Transport::Direct { .. } => {
                request.header(DIRECT_KEY_HEADER, self.config.api_key.as_str())
            }
            Transport::Gateway { host } => request
                .header(GATEWAY_KEY_HEADER, self.config.api_key.as_str())
                .header(GATEWAY_HOST_HEADER, host.as_str()),
        };

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => return classify_transport_error(&e),
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => return classify_transport_error(&e),
        };

        let outcome = classify_response(status, &body);
        debug!(
            status = status.as_u16(),
            outcome = discriminant_name(&outcome),
            "backend response classified"
        );
        outcome
    }

    /// [`Self::search`] rendered to the agent-facing string.
    pub async fn search_text(&self, query: &str, top_k: i64) -> String {
        self.search(query, top_k).await.render(self.config.mode())
    }
}

/// Clamp a requested result count into the range the server accepts.
#[must_use]
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn clamp_top_k(top_k: i64) -> u32 {
    top_k.clamp(TOP_K_MIN, TOP_K_MAX) as u32
}

/// Deterministic status dispatch, in priority order.
#[must_use]
pub fn classify_response(status: StatusCode, body: &[u8]) -> QueryOutcome {
    if status == StatusCode::OK {
        return match serde_json::from_slice::<Value>(body) {
            Ok(payload) => QueryOutcome::Success(payload),
            Err(e) => QueryOutcome::Failed(format!("invalid JSON in response body: {e}")),
        };
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let (used, limit) = quota_counters(body);
        return QueryOutcome::QuotaExceeded { used, limit };
    }

    if status == StatusCode::PAYMENT_REQUIRED || status == StatusCode::FORBIDDEN {
        return QueryOutcome::PaymentRequired;
    }

    if status == StatusCode::UNAUTHORIZED {
        // Only a structured `detail` object earns the sign-up pointers;
        // anything else gets the generic rejection line.
        let structured = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| v.get("detail").cloned())
            .is_some_and(|d| d.is_object());
        return if structured {
            QueryOutcome::AuthRequired
        } else {
            QueryOutcome::AuthRejected
        };
    }

    if status.is_server_error() {
        return QueryOutcome::Unavailable;
    }

    QueryOutcome::UnexpectedStatus(status.as_u16())
}

fn classify_transport_error(e: &reqwest::Error) -> QueryOutcome {
    if e.is_timeout() {
        return QueryOutcome::TimedOut;
    }
    if e.is_connect() {
        return QueryOutcome::ConnectFailed;
    }
    QueryOutcome::Failed(sanitize_reqwest_error(e))
}

fn quota_counters(body: &[u8]) -> (String, String) {
    let Ok(v) = serde_json::from_slice::<Value>(body) else {
        return (QUOTA_FALLBACK.to_string(), QUOTA_FALLBACK.to_string());
    };
    (counter_field(v.get("used")), counter_field(v.get("limit")))
}

fn counter_field(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => QUOTA_FALLBACK.to_string(),
    }
}

fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}

fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

fn discriminant_name(outcome: &QueryOutcome) -> &'static str {
    match outcome {
        QueryOutcome::Success(_) => "success",
        QueryOutcome::QuotaExceeded { .. } => "quota_exceeded",
        QueryOutcome::PaymentRequired => "payment_required",
        QueryOutcome::AuthRequired => "auth_required",
        QueryOutcome::AuthRejected => "auth_rejected",
        QueryOutcome::Unavailable => "unavailable",
        QueryOutcome::UnexpectedStatus(_) => "unexpected_status",
        QueryOutcome::TimedOut => "timed_out",
        QueryOutcome::ConnectFailed => "connect_failed",
        QueryOutcome::Failed(_) => "failed",
    }
}
