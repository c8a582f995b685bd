use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::access::identity::IdentityContext;
use crate::access::phase::{SessionEvent, SessionPhase};
use crate::access::router::{default_module, modules_for, route_token, Module, RouteDecision, View};
use crate::errors::AppError;
use crate::models::profile::{NewProfile, Role};
use crate::state::AppState;

/// Identity handed over by the authentication provider after a successful sign-in.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    /// Raw role claim; absent, null or unknown all mean no usable role.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub phase: SessionPhase,
    pub identity: IdentityContext,
    pub default_module: Module,
    pub modules: Vec<Module>,
}

impl SessionResponse {
    fn for_identity(identity: IdentityContext, role: Role) -> Self {
        Self {
            phase: identity.phase(),
            default_module: default_module(role),
            modules: modules_for(role),
            identity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub phase: SessionPhase,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub module: String,
    pub view: View,
}

/// POST /api/v1/identity/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let Json(req) = body?;
    let claim = req.role.as_deref().and_then(Role::parse);

    let phase = SessionPhase::Unauthenticated
        .on(SessionEvent::SignInStarted)
        .and_then(|p| p.on(SessionEvent::RoleResolved(claim)))
        .map_err(|e| AppError::Internal(e.into()))?;
    let Some(role) = claim.filter(|_| phase.is_terminal()) else {
        info!("Sign-in for {} rejected: role claim {:?}", req.user_id, req.role);
        return Err(AppError::Unauthorized);
    };

    let profile = state
        .directory
        .provision_profile(NewProfile {
            user_id: req.user_id,
            full_name: req.full_name,
            email: req.email,
            role,
        })
        .await?;

    // The stored role wins over the claim in the request.
    let identity = IdentityContext::from_profile(&profile);
    let Some(role) = identity.role else {
        return Err(AppError::Unauthorized);
    };
    info!("User {} signed in as {role}", identity.user_id);
    Ok(Json(SessionResponse::for_identity(identity, role)))
}

/// GET /api/v1/identity/session
pub async fn handle_current_session(
    identity: IdentityContext,
) -> Result<Json<SessionResponse>, AppError> {
    let Some(role) = identity.role else {
        return Err(AppError::Unauthorized);
    };
    Ok(Json(SessionResponse::for_identity(identity, role)))
}

/// POST /api/v1/identity/sign-out
pub async fn handle_sign_out(
    identity: IdentityContext,
) -> Result<Json<SignOutResponse>, AppError> {
    let phase = identity
        .phase()
        .on(SessionEvent::SignedOut)
        .map_err(|e| AppError::Internal(e.into()))?;
    info!("User {} signed out", identity.user_id);
    Ok(Json(SignOutResponse { phase }))
}

/// GET /api/v1/session/view/:module
pub async fn handle_route_view(
    identity: IdentityContext,
    Path(module): Path<String>,
) -> Result<Json<ViewResponse>, AppError> {
    match route_token(identity.role, &module) {
        RouteDecision::Render(view) => Ok(Json(ViewResponse { module, view })),
        RouteDecision::Unauthorized => Err(AppError::Forbidden),
        RouteDecision::Reauthenticate => Err(AppError::Unauthorized),
    }
}
