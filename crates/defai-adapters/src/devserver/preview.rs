//! Preview server: element harness page, API docs and a mock host API.
//!
//! | Route                  | Response                                   |
//! |------------------------|--------------------------------------------|
//! | `GET /preview`         | HTML harness framing the dev server        |
//! | `GET /api-docs`        | Swagger UI over `/api/openapi.json`        |
//! | `GET /api/openapi.json`| OpenAPI description of the mock API        |
//! | `GET /manifest.json`   | The project manifest, reloaded on change   |
//! | `GET /api/wallet`      | A connected mock wallet                    |
//! | `GET /api/prices/:sym` | Fixed mock price for `sym`                 |

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Html,
    routing::get,
};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::{
    net::TcpListener,
    sync::{RwLock, oneshot},
    task::JoinHandle,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, instrument};

use super::DevServerError;

const PREVIEW_TEMPLATE: &str = include_str!("../../assets/preview.html");
const API_DOCS: &str = include_str!("../../assets/api-docs.html");

pub const MOCK_WALLET_ADDRESS: &str = "8xY9ZQs4CtBTgZP3GYkWwBeGYDWkjPS7HpqQoqBon7NV";
pub const MOCK_WALLET_BALANCE: u64 = 1000;

/// Mock prices served by `/api/prices/:symbol`; anything else is 0.
pub const MOCK_PRICES: [(&str, f64); 3] = [("SOL", 100.50), ("DEFAI", 0.001234), ("USDC", 1.00)];

/// Shared by the handlers and the manifest watcher.
#[derive(Clone)]
pub struct PreviewState {
    manifest: Arc<RwLock<Value>>,
    dev_port: u16,
}

impl PreviewState {
    pub fn new(manifest: Value, dev_port: u16) -> Self {
        Self {
            manifest: Arc::new(RwLock::new(manifest)),
            dev_port,
        }
    }

    pub async fn manifest(&self) -> Value {
        self.manifest.read().await.clone()
    }

    pub async fn replace_manifest(&self, manifest: Value) {
        *self.manifest.write().await = manifest;
    }

    pub fn dev_port(&self) -> u16 {
        self.dev_port
    }
}

#[derive(Debug, Serialize)]
pub struct WalletInfo {
    pub connected: bool,
    pub address: &'static str,
    pub balance: u64,
}

#[derive(Debug, Serialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
    pub timestamp: String,
}

pub fn router(state: PreviewState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/preview", get(preview))
        .route("/api-docs", get(api_docs))
        .route("/api/openapi.json", get(openapi))
        .route("/manifest.json", get(manifest))
        .route("/api/wallet", get(wallet))
        .route("/api/prices/:symbol", get(price))
        .with_state(state)
        .layer(cors)
}

async fn preview(State(state): State<PreviewState>) -> Html<String> {
    Html(render_preview(&state.manifest().await, state.dev_port))
}

async fn api_docs() -> Html<&'static str> {
    Html(API_DOCS)
}

async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

async fn manifest(State(state): State<PreviewState>) -> Json<Value> {
    Json(state.manifest().await)
}

async fn wallet() -> Json<WalletInfo> {
    Json(WalletInfo {
        connected: true,
        address: MOCK_WALLET_ADDRESS,
        balance: MOCK_WALLET_BALANCE,
    })
}

async fn price(Path(symbol): Path<String>) -> Json<PriceQuote> {
    Json(PriceQuote {
        price: mock_price(&symbol),
        symbol,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub fn mock_price(symbol: &str) -> f64 {
    MOCK_PRICES
        .iter()
        .find(|(known, _)| *known == symbol)
        .map_or(0.0, |(_, price)| *price)
}

// ============================================================================
// Rendering
// ============================================================================

/// Fill the harness template from a manifest. Missing fields render empty so
/// a half-edited manifest still previews.
pub fn render_preview(manifest: &Value, dev_port: u16) -> String {
    let text = |key: &str| {
        escape_html(&match manifest.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
    };
    let dim = |size: &str, axis: &str| {
        manifest
            .get(size)
            .and_then(|s| s.get(axis))
            .and_then(Value::as_u64)
            .map(|v| v.to_string())
            .unwrap_or_default()
    };

    let permissions: String = manifest
        .get("permissions")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(name, granted)| granted.as_bool().map(|g| (name, g)))
        .map(|(name, granted)| {
            format!(
                "        <div class=\"permission\">\n          \
                 <div class=\"permission-icon {}\"></div>\n          \
                 <span>{}</span>\n        </div>\n",
                if granted { "granted" } else { "denied" },
                escape_html(name)
            )
        })
        .collect();

    [
        ("{{name}}", text("name")),
        ("{{version}}", text("version")),
        ("{{category}}", text("category")),
        ("{{tier}}", text("tierRequired")),
        ("{{author}}", text("author")),
        ("{{width}}", dim("defaultSize", "width")),
        ("{{height}}", dim("defaultSize", "height")),
        ("{{min_width}}", dim("minSize", "width")),
        ("{{min_height}}", dim("minSize", "height")),
        ("{{max_width}}", dim("maxSize", "width")),
        ("{{max_height}}", dim("maxSize", "height")),
        ("{{permissions}}", permissions),
        ("{{port}}", dev_port.to_string()),
    ]
    .iter()
    .fold(PREVIEW_TEMPLATE.to_string(), |html, (placeholder, value)| {
        html.replace(placeholder, value)
    })
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "DEFAI Element Host API (development mock)",
            "version": "1.0.0"
        },
        "paths": {
            "/api/wallet": {
                "get": {
                    "summary": "Connected wallet",
                    "responses": {"200": {"description": "Wallet address and balance"}}
                }
            },
            "/api/prices/{symbol}": {
                "get": {
                    "summary": "Token price",
                    "parameters": [{
                        "name": "symbol",
                        "in": "path",
                        "required": true,
                        "schema": {"type": "string"}
                    }],
                    "responses": {"200": {"description": "Price quote with timestamp"}}
                }
            },
            "/manifest.json": {
                "get": {
                    "summary": "Element manifest",
                    "responses": {"200": {"description": "The manifest being previewed"}}
                }
            }
        }
    })
}

// ============================================================================
// Server
// ============================================================================

/// A running preview server.
pub struct PreviewServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl PreviewServer {
    /// Serve on an ephemeral loopback port.
    #[instrument(skip_all)]
    pub async fn start(state: PreviewState) -> Result<Self, DevServerError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|source| DevServerError::Bind {
                addr: "127.0.0.1:0".into(),
                source,
            })?;
        let addr = listener.local_addr().map_err(DevServerError::Server)?;

        let (shutdown, stopped) = oneshot::channel::<()>();
        let app = router(state);
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    stopped.await.ok();
                })
                .await
        });

        info!(%addr, "preview server listening");
        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub async fn stop(self) -> Result<(), DevServerError> {
        // The receiver is gone only if the server already exited.
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(result) => result.map_err(DevServerError::Server)?,
            Err(e) => debug!(error = %e, "preview server task ended abnormally"),
        }
        debug!("preview server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Value {
        json!({
            "name": "Price <Ticker>",
            "version": "1.2.0",
            "category": "Trading",
            "tierRequired": "gold",
            "author": "Ada",
            "defaultSize": {"width": 400, "height": 300},
            "minSize": {"width": 200, "height": 150},
            "maxSize": {"width": 800, "height": 600},
            "permissions": {"wallet": true, "network": false}
        })
    }

    #[test]
    fn harness_shows_manifest_and_bounds() {
        let html = render_preview(&manifest(), 3000);
        assert!(html.contains("Price &lt;Ticker&gt; - Element Preview"));
        assert!(html.contains(r#"value="400" min="200" max="800""#));
        assert!(html.contains(r#"value="300" min="150" max="600""#));
        assert!(html.contains("Development server running on port 3000"));
        assert!(html.contains(r#"src="http://localhost:3000""#));
        assert!(html.contains("permission-icon granted"));
        assert!(html.contains("permission-icon denied"));
        assert!(html.contains("type: 'resize'"));
        assert!(html.contains("type: 'theme'"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn partial_manifest_still_renders() {
        let html = render_preview(&json!({"name": "Half"}), 3001);
        assert!(html.contains("<title>Half - Element Preview</title>"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn unknown_symbols_cost_nothing() {
        assert_eq!(mock_price("SOL"), 100.50);
        assert_eq!(mock_price("DEFAI"), 0.001234);
        assert_eq!(mock_price("DOGE"), 0.0);
    }

    async fn get(addr: SocketAddr, path: &str) -> reqwest::Response {
        reqwest::get(format!("http://{addr}{path}")).await.unwrap()
    }

    #[tokio::test]
    async fn serves_mock_api_and_manifest() {
        let state = PreviewState::new(manifest(), 3000);
        let server = PreviewServer::start(state.clone()).await.unwrap();
        let addr = server.addr();

        let wallet: Value = get(addr, "/api/wallet").await.json().await.unwrap();
        assert_eq!(wallet["connected"], true);
        assert_eq!(wallet["address"], MOCK_WALLET_ADDRESS);
        assert_eq!(wallet["balance"], 1000);

        let quote: Value = get(addr, "/api/prices/USDC").await.json().await.unwrap();
        assert_eq!(quote["symbol"], "USDC");
        assert_eq!(quote["price"], 1.0);
        assert!(quote["timestamp"].is_string());

        state.replace_manifest(json!({"name": "Reloaded"})).await;
        let served: Value = get(addr, "/manifest.json").await.json().await.unwrap();
        assert_eq!(served["name"], "Reloaded");

        let response = get(addr, "/preview").await;
        assert_eq!(response.status(), 200);
        assert!(response.text().await.unwrap().contains("Reloaded"));

        let docs = get(addr, "/api-docs").await.text().await.unwrap();
        assert!(docs.contains("/api/openapi.json"));

        server.stop().await.unwrap();
    }
}
