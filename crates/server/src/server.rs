//! Tool surface: one MCP tool, `consult_federal_regulations`.
//!
//! The front-end only selects a credential path and dispatches to the
//! backend client; the adapter's returned string is passed through to the
//! agent unchanged.

use far_oracle_backend::config::CredentialEnv;
use far_oracle_backend::outcome::QueryOutcome;
use far_oracle_backend::query::FarQueryClient;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;

/// Clauses returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: i64 = 5;

/// Returned when neither credential variable is set; no network call is made.
const MISSING_CREDENTIALS_HELP: &str = "Error: No API key configured. Set either:\n\
     - FAR_API_KEY: Register at https://far-rag-api-production.up.railway.app/v1/register\n\
     - RAPIDAPI_KEY: Get key at https://rapidapi.com/yschang/api/far-rag";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConsultRequest {
    /// Natural language question about federal acquisition regulations.
    /// Examples: "cybersecurity requirements", "small business set aside",
    /// "payment terms for government contracts".
    pub query: String,
    /// Number of relevant clauses to return (1-20, default 5).
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Clone)]
pub struct FarOracleServer {
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FarOracleServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search Federal Acquisition Regulations (FAR) for compliance rules, \
                       contract clauses, and procurement requirements. Use this tool to verify \
                       government contracting compliance requirements, find specific FAR clauses \
                       for contract proposals, understand invoicing rules for federal contracts, \
                       research procurement regulations and procedures, or check small business \
                       set-aside requirements. Returns JSON with relevant FAR clauses, or an \
                       error message if the quota is exceeded."
    )]
    async fn consult_federal_regulations(
        &self,
        Parameters(request): Parameters<ConsultRequest>,
    ) -> Result<CallToolResult, McpError> {
        let top_k = request.top_k.unwrap_or(DEFAULT_TOP_K);
        let text = consult(&CredentialEnv::capture(), &request.query, top_k).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

impl Default for FarOracleServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for FarOracleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Search Federal Acquisition Regulations (FAR). Configure FAR_API_KEY (direct) \
                 or RAPIDAPI_KEY (RapidAPI marketplace) before calling tools."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Credential selection + dispatch, with the environment passed in
/// explicitly so tests never mutate process state.
async fn consult(env: &CredentialEnv, query: &str, top_k: i64) -> String {
    let Some(config) = env.resolve() else {
        tracing::warn!("no FAR credentials configured; skipping backend call");
        return MISSING_CREDENTIALS_HELP.to_string();
    };

    let mode = config.mode();
    match FarQueryClient::new(config) {
        Ok(client) => client.search_text(query, top_k).await,
        Err(e) => QueryOutcome::Failed(e.to_string()).render(mode),
    }
}

/// Serve over stdio until the hosting runtime closes the pipe.
pub async fn serve_stdio() -> anyhow::Result<()> {
    let service = FarOracleServer::new().serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    async fn spawn_mock(app: Router) -> (String, tokio::sync::oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move {
            let _ = server.await;
        });
        (format!("http://{addr}"), shutdown_tx)
    }

    #[tokio::test]
    async fn consult_without_credentials_makes_no_network_call() {
        async fn count_hit(State(hits): State<Arc<AtomicUsize>>) -> axum::Json<Value> {
            hits.fetch_add(1, Ordering::SeqCst);
            axum::Json(json!([]))
        }

        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/search", post(count_hit))
            .with_state(hits.clone());
        let (base_url, shutdown_tx) = spawn_mock(app).await;

        // Upstream is configured and reachable, but no credential is set.
        let env = CredentialEnv {
            direct_base_url: Some(base_url),
            ..CredentialEnv::default()
        };
        let text = consult(&env, "invoicing rules", DEFAULT_TOP_K).await;

        assert_eq!(text, MISSING_CREDENTIALS_HELP);
        assert!(text.contains("FAR_API_KEY"));
        assert!(text.contains("RAPIDAPI_KEY"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn consult_uses_direct_transport_when_both_keys_are_set() {
        async fn reflect_headers(headers: HeaderMap) -> axum::Json<Value> {
            let get = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            axum::Json(json!({
                "x_api_key": get("x-api-key"),
                "x_rapidapi_key": get("x-rapidapi-key"),
            }))
        }

        let app = Router::new().route("/search", post(reflect_headers));
        let (base_url, shutdown_tx) = spawn_mock(app).await;

        let env = CredentialEnv {
            far_api_key: Some("direct-key".into()),
            rapidapi_key: Some("rapid-key".into()),
            direct_base_url: Some(base_url),
            ..CredentialEnv::default()
        };
        let text = consult(&env, "set asides", DEFAULT_TOP_K).await;

        let seen: Value = serde_json::from_str(&text).expect("success payload");
        assert_eq!(seen["x_api_key"], json!("direct-key"));
        assert_eq!(seen["x_rapidapi_key"], Value::Null);

        let _ = shutdown_tx.send(());
    }
}
