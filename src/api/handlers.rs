use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Decision, NewPassRequest, Outcome, PassRequest, RequestStatus, Role};
use crate::workflow::{self, query};
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub role: Role,
}

/// Moderator decision body. Accepts the legacy `moderator*` names too.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DecisionBody {
    #[serde(default, alias = "moderatorName")]
    pub reviewer_name: Option<String>,
    #[serde(default, alias = "moderatorRemarks")]
    pub reviewer_remarks: Option<String>,
}

#[derive(Serialize)]
pub struct RequestEnvelope {
    pub success: bool,
    pub message: String,
    pub request: PassRequest,
}

#[derive(Serialize)]
pub struct RequestList {
    pub requests: Vec<PassRequest>,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<PassRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /api/login — check a username/password/role triple
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(username), Some(password), Some(role)) =
        (payload.username, payload.password, payload.role)
    else {
        return Err(AppError::Validation(
            "username, password and role are required".into(),
        ));
    };
    let role: Role = role.parse().map_err(AppError::Validation)?;

    match state.store.find_user(&username).await {
        Some(user) if user.matches(&username, &password, role) => {
            tracing::info!(user = %username, role = role.as_str(), "login succeeded");
            Ok(Json(LoginResponse {
                success: true,
                message: "Login successful".into(),
                role,
            }))
        }
        _ => {
            tracing::warn!(user = %username, role = role.as_str(), "login failed");
            Err(AppError::InvalidCredentials)
        }
    }
}

/// POST /api/requests — submit a new exit request
pub async fn submit_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewPassRequest>,
) -> Result<(StatusCode, Json<RequestEnvelope>), AppError> {
    let request = workflow::submit(&state.store, payload).await?;
    state.metrics.record_submission();

    Ok((
        StatusCode::CREATED,
        Json(RequestEnvelope {
            success: true,
            message: "Request created".into(),
            request,
        }),
    ))
}

/// GET /api/requests/requester/:name — a requester's own requests, newest first
pub async fn list_by_requester(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<RequestList> {
    Json(RequestList {
        requests: query::by_requester(&state.store, &name).await,
    })
}

/// GET /api/requests/pending — the moderator queue
pub async fn list_pending(State(state): State<Arc<AppState>>) -> Json<RequestList> {
    Json(RequestList {
        requests: query::by_status(&state.store, RequestStatus::Pending).await,
    })
}

/// GET /api/requests/approved — passes the gatekeeper may see
pub async fn list_approved(State(state): State<Arc<AppState>>) -> Json<RequestList> {
    Json(RequestList {
        requests: query::by_status(&state.store, RequestStatus::Approved).await,
    })
}

/// PUT /api/requests/:id/:action — approve or reject a pending request
pub async fn decide_request(
    State(state): State<Arc<AppState>>,
    Path((id, action)): Path<(String, String)>,
    body: Option<Json<DecisionBody>>,
) -> Result<Json<RequestEnvelope>, AppError> {
    let outcome: Outcome = action.parse().map_err(AppError::Validation)?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let decision = Decision {
        outcome,
        reviewer_name: body.reviewer_name.unwrap_or_default(),
        remarks: body.reviewer_remarks,
    };

    let request = workflow::decide(&state.store, &id, decision).await?;
    state.metrics.record_decision(outcome);

    Ok(Json(RequestEnvelope {
        success: true,
        message: format!("Request {}", outcome.as_str()),
        request,
    }))
}

/// GET /api/verify/:pass_id — gate check of a scanned pass
pub async fn verify_pass(
    State(state): State<Arc<AppState>>,
    Path(pass_id): Path<String>,
) -> (StatusCode, Json<VerifyResponse>) {
    let verification = workflow::verify(&state.store, &pass_id).await;
    state.metrics.record_verification(verification.valid);

    if verification.valid {
        (
            StatusCode::OK,
            Json(VerifyResponse {
                success: true,
                valid: true,
                request: verification.request,
                message: None,
            }),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(VerifyResponse {
                success: false,
                valid: false,
                request: None,
                message: Some("Invalid or not approved".into()),
            }),
        )
    }
}

/// GET /metrics — Prometheus scrape endpoint
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let body = state.metrics.render()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
