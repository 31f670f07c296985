//! strategy-advisor HTTP Server
//!
//! Axum-based REST API over the allocation analyzer and health scorer.
//! Read-only: it compares and scores, it never signs or sends anything.

mod auth;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strategy_advisor::AdvisorConfig;
use strategy_advisor::balance::{BalanceSource, MockBalanceSource};

use crate::auth::{AccessGate, require_access_code};
use crate::handlers::{analyze_allocation, analyze_wallet, health_check, list_profiles, score_health};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Advisor configuration
    let config = AdvisorConfig::from_env()?;
    let analyzer = config.build_analyzer()?;

    tracing::info!("Variant: {:?}", config.variant);
    tracing::info!("Exposure rule: {}", analyzer.settings().exposure_rule.as_str());
    match &config.profiles_path {
        Some(path) => tracing::info!("Profiles loaded from {}", path.display()),
        None => tracing::info!("Using the built-in SAFE / MID / DEGEN catalog"),
    }
    match analyzer.composite_threshold() {
        Some(t) => tracing::info!("Composite threshold: {}", t),
        None => tracing::info!("Composite profiles: comparison only"),
    }

    // Balance source for wallet lookups
    let balances: Arc<dyn BalanceSource> = Arc::new(MockBalanceSource::new());
    tracing::warn!("⚠ Wallet balances come from {} (simulated)", balances.name());

    let access = AccessGate::from_env();
    if access.is_enabled() {
        tracing::info!("✓ Access code required on /api routes");
    } else {
        tracing::warn!("⚠ No access code set - /api routes are open");
    }

    let state = AppState {
        analyzer: Arc::new(analyzer),
        balances,
        access,
    };

    let app = build_router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 strategy-advisor server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                  - Health check");
    tracing::info!("  GET  /api/profiles            - List risk profiles");
    tracing::info!("  POST /api/allocation/analyze  - Compare balances to a profile");
    tracing::info!("  POST /api/allocation/wallet   - Compare a wallet to a profile");
    tracing::info!("  POST /api/health/score        - Score treasury health");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/profiles", get(list_profiles))
        .route("/api/allocation/analyze", post(analyze_allocation))
        .route("/api/allocation/wallet", post(analyze_wallet))
        .route("/api/health/score", post(score_health))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_access_code));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use strategy_advisor::AllocationAnalyzer;
    use tower::ServiceExt;

    fn app(access: AccessGate) -> Router {
        build_router(AppState {
            analyzer: Arc::new(AllocationAnalyzer::default()),
            balances: Arc::new(MockBalanceSource::new()),
            access,
        })
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["balance_source"], "MockBalances");
        assert_eq!(body["exposure_rule"], "exclude_debt");
    }

    #[tokio::test]
    async fn test_list_profiles() {
        let request = Request::builder().uri("/api/profiles").body(Body::empty()).unwrap();
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["SAFE", "MID", "DEGEN"]);
    }

    #[tokio::test]
    async fn test_analyze_safe_profile() {
        let request = post_json(
            "/api/allocation/analyze",
            json!({
                "portfolio": {"hodl": 2000, "lending": 3000, "liquidity_pool": 1000, "borrowing": 0},
                "profile": "SAFE"
            }),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"], "SAFE");
        assert_eq!(
            body["actions"],
            json!(["INCREASE HODL by 11.7%", "REDUCE LIQUIDITY_POOL by 6.7%"])
        );
        assert!(body["request_id"].is_string());
        assert!(body.get("address").is_none());
    }

    #[tokio::test]
    async fn test_analyze_zero_weights() {
        let request = post_json(
            "/api/allocation/analyze",
            json!({
                "portfolio": {"hodl": 100},
                "weights": {"safe": 0, "mid": 0, "degen": 0}
            }),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNDEFINED_BLEND");
    }

    #[tokio::test]
    async fn test_composite_comparison_only() {
        let request = post_json(
            "/api/allocation/analyze",
            json!({
                "portfolio": {"hodl": 2000, "lending": 3000, "liquidity_pool": 1000},
                "weights": {"safe": 40, "mid": 60, "degen": 0}
            }),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"], "COMPOSITE");
        assert!(body["threshold"].is_null());
        assert_eq!(body["actions"], json!([]));
    }

    #[tokio::test]
    async fn test_wallet_lookup() {
        let request = post_json(
            "/api/allocation/wallet",
            json!({"address": "0xabc00ff", "profile": "MID"}),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], "0xabc00ff");
        assert_eq!(body["portfolio"]["hodl"], "2550");
        assert_eq!(body["total_exposure"], "10475");
    }

    #[tokio::test]
    async fn test_wallet_address_trimmed_once() {
        let request = post_json(
            "/api/allocation/wallet",
            json!({"address": "  0xabc00ff\n", "profile": "SAFE"}),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], "0xabc00ff");
    }

    #[tokio::test]
    async fn test_named_profile_with_threshold_rejected() {
        let request = post_json(
            "/api/allocation/analyze",
            json!({"portfolio": {"hodl": 100}, "profile": "SAFE", "threshold": 0.01}),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_overflowing_amounts_are_bad_requests() {
        let request = post_json(
            "/api/allocation/analyze",
            json!({"portfolio": {"hodl": "0.000000001", "borrowing": "100000000000000000000"}, "profile": "SAFE"}),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");

        let request = post_json(
            "/api/health/score",
            json!({"btc": "79228162514337593543950335", "eth": "79228162514337593543950335"}),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall"], 63);
    }

    #[tokio::test]
    async fn test_wallet_invalid_address() {
        let request = post_json(
            "/api/allocation/wallet",
            json!({"address": "abc123", "profile": "SAFE"}),
        );
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_IDENTIFIER");
    }

    #[tokio::test]
    async fn test_score() {
        let request = post_json("/api/health/score", json!({"stablecoins": 1000}));
        let (status, body) = send(app(AccessGate::open()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall"], 66);
        assert_eq!(body["profile"], "SAFE");

        let request = post_json("/api/health/score", json!({"btc": 1000, "ltv": 90}));
        let (status, body) = send(app(AccessGate::open()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_access_gate() {
        let gated = app(AccessGate::with_code("WALLET"));

        let request = Request::builder().uri("/api/profiles").body(Body::empty()).unwrap();
        let (status, body) = send(gated.clone(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "MISSING_ACCESS_CODE");

        let request = Request::builder()
            .uri("/api/profiles")
            .header(auth::ACCESS_CODE_HEADER, "WALLET")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(gated.clone(), request).await;
        assert_eq!(status, StatusCode::OK);

        // health stays open
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(gated, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["access_gate"], true);
    }
}
