//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use strategy_advisor::{
    AdvisorError, AllocationReport, BlendWeights, ExposureRule, Portfolio, Profile, ProfileName,
    ProfileSelection, ScoreInputs, ScoreResult, analyze_health,
};

use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub exposure_rule: ExposureRule,
    pub balance_source: String,
    pub access_gate: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub portfolio: Portfolio,
    #[serde(flatten)]
    pub target: TargetRequest,
}

#[derive(Debug, Deserialize)]
pub struct WalletRequest {
    pub address: String,
    #[serde(flatten)]
    pub target: TargetRequest,
}

/// Either a named profile or blend weights, plus an optional composite threshold
#[derive(Debug, Default, Deserialize)]
pub struct TargetRequest {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub weights: Option<BlendWeights>,
    #[serde(default)]
    pub threshold: Option<Decimal>,
}

impl TargetRequest {
    pub fn selection(&self) -> Result<ProfileSelection, AdvisorError> {
        match (&self.profile, self.weights) {
            (Some(_), Some(_)) => Err(AdvisorError::InvalidInput(
                "give either a profile or blend weights, not both".into(),
            )),
            (None, None) => Err(AdvisorError::InvalidInput(
                "a profile or blend weights are required".into(),
            )),
            (Some(_), None) if self.threshold.is_some() => Err(AdvisorError::InvalidInput(
                "threshold applies to blend weights only; named profiles carry their own".into(),
            )),
            (Some(name), None) => Ok(ProfileSelection::Named(name.parse::<ProfileName>()?)),
            (None, Some(weights)) => Ok(ProfileSelection::Composite {
                weights,
                threshold: self.threshold,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub request_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<Portfolio>,
    #[serde(flatten)]
    pub report: AllocationReport,

    /// Directives rendered as text, e.g. "INCREASE HODL by 11.7%"
    pub actions: Vec<String>,
    pub summary: String,
}

impl AnalyzeResponse {
    fn new(report: AllocationReport) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            address: None,
            portfolio: None,
            actions: report.directives.iter().map(ToString::to_string).collect(),
            summary: report.summary(),
            report,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub request_id: String,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: ScoreResult,
    pub summary: String,
}

fn api_error(e: AdvisorError) -> (StatusCode, Json<ErrorResponse>) {
    let status = if e.is_client_error() {
        tracing::warn!("Rejected request: {}", e);
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("Request failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: e.user_message(),
            code: e.code().into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        exposure_rule: state.analyzer.settings().exposure_rule,
        balance_source: state.balances.name().to_string(),
        access_gate: state.access.is_enabled(),
    })
}

/// List the SAFE / MID / DEGEN profiles
pub async fn list_profiles(State(state): State<AppState>) -> Json<Vec<Profile>> {
    Json(state.analyzer.catalog().iter().cloned().collect())
}

/// Compare supplied balances against a profile
pub async fn analyze_allocation(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> ApiResult<AnalyzeResponse> {
    let selection = payload.target.selection().map_err(api_error)?;
    let report = state
        .analyzer
        .analyze(&payload.portfolio, &selection)
        .map_err(api_error)?;

    Ok(Json(AnalyzeResponse::new(report)))
}

/// Look up a wallet's balances and compare them against a profile
pub async fn analyze_wallet(
    State(state): State<AppState>,
    Json(payload): Json<WalletRequest>,
) -> ApiResult<AnalyzeResponse> {
    let selection = payload.target.selection().map_err(api_error)?;
    let address = payload.address.trim();

    let portfolio = state.balances.fetch(address).await.map_err(api_error)?;
    tracing::info!(
        address = %address,
        source = %state.balances.name(),
        "Fetched wallet balances"
    );

    let report = state
        .analyzer
        .analyze(&portfolio, &selection)
        .map_err(api_error)?;

    let mut response = AnalyzeResponse::new(report);
    response.address = Some(address.to_string());
    response.portfolio = Some(portfolio);
    Ok(Json(response))
}

/// Score a treasury's stability, risk and yield
pub async fn score_health(Json(inputs): Json<ScoreInputs>) -> ApiResult<ScoreResponse> {
    let result = analyze_health(&inputs).map_err(api_error)?;

    Ok(Json(ScoreResponse {
        request_id: Uuid::new_v4().to_string(),
        generated_at: Utc::now(),
        summary: result.summary(),
        result,
    }))
}
