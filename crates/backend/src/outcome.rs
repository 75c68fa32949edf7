//! Classified results of one backend query, and their agent-facing text.
//!
//! Classification and wording are deliberately separate: the query layer
//! produces a [`QueryOutcome`], and [`QueryOutcome::render`] is the only
//! place message text lives. The consumer of this API is an autonomous
//! agent, so success and every failure class share one string channel.

use crate::config::TransportMode;
use serde_json::Value;

/// Counter value reported when a 429 body is absent or unparsable.
pub const QUOTA_FALLBACK: &str = "500";

/// Everything a single `/search` round trip can resolve to.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// 200: the upstream JSON payload, passed through opaquely.
    Success(Value),
    /// 429: monthly quota exhausted; counters from the body when present.
    QuotaExceeded { used: String, limit: String },
    /// 402/403: subscription lapsed or payment missing.
    PaymentRequired,
    /// 401 with a structured `detail` object: key invalid or expired.
    AuthRequired,
    /// 401 without a structured `detail`: generic rejection.
    AuthRejected,
    /// 5xx: upstream is down; worth retrying later.
    Unavailable,
    /// Any other status code.
    UnexpectedStatus(u16),
    /// The request hit the configured deadline.
    TimedOut,
    /// No connection could be established.
    ConnectFailed,
    /// Anything else, with a sanitized description.
    Failed(String),
}

impl QueryOutcome {
    /// Render to the text handed back to the agent.
    ///
    /// Quota wording depends on the transport: marketplace users upgrade on
    /// the RapidAPI listing, direct users through the service's own tiers.
    #[must_use]
    pub fn render(&self, mode: TransportMode) -> String {
        match self {
            Self::Success(payload) => serde_json::to_string_pretty(payload)
                .unwrap_or_else(|_| payload.to_string()),

            Self::QuotaExceeded { used, limit } => match mode {
                TransportMode::Gateway => format!(
                    "⚠️ QUOTA EXCEEDED ({used}/{limit} queries this month)\n\n\
                     Your free tier limit has been reached.\n\n\
                     To upgrade:\n\
                     → Visit: https://rapidapi.com/yschang/api/far-rag-federal-acquisition-regulation-search\n\
                     → Subscribe to Pro ($29/mo) or Ultra ($199/mo)\n\n\
                     Your quota resets on the 1st of next month."
                ),
                TransportMode::Direct => format!(
                    "⚠️ QUOTA EXCEEDED ({used}/{limit} queries this month)\n\n\
                     Your free tier limit has been reached.\n\n\
                     Upgrade options:\n\
                     • Pro: $29/month for 5,000 queries\n\
                     • Unlimited: $199/month for unlimited queries\n\n\
                     To upgrade, contact: support@blueskylineassets.com\n\
                     Or visit: https://far-rag-api-production.up.railway.app/docs\n\n\
                     Your quota resets on the 1st of next month."
                ),
            },

            Self::PaymentRequired => "⚠️ PAYMENT REQUIRED\n\n\
                 Your API subscription has expired or requires payment.\n\n\
                 Please update your payment method to continue using FAR Oracle."
                .to_string(),

            Self::AuthRequired => "⚠️ AUTHENTICATION REQUIRED\n\n\
                 Your API key may be invalid or expired.\n\n\
                 To get a new key:\n\
                 → Register: https://far-rag-api-production.up.railway.app/v1/register\n\
                 → Or use RapidAPI: https://rapidapi.com/yschang/api/far-rag-federal-acquisition-regulation-search"
                .to_string(),

            Self::AuthRejected => {
                "Error: Authentication failed. Please check your API key.".to_string()
            }

            Self::Unavailable => {
                "Error: FAR RAG Service Unavailable. Please try again later.".to_string()
            }

            Self::UnexpectedStatus(status) => {
                format!("Error: Unexpected API response (HTTP {status})")
            }

            Self::TimedOut => {
                "Error: Request timed out. The FAR service may be experiencing high load."
                    .to_string()
            }

            Self::ConnectFailed => {
                "Error: Connection failed. Please check your network connection.".to_string()
            }

            Self::Failed(description) => format!("Error: {description}"),
        }
    }
}
