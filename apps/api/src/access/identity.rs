//! Who is calling and with which role claim.
//!
//! The authentication provider sits in front of this service and forwards the
//! signed-in user's id in a header (`IDENTITY_HEADER`, default `x-user-id`).
//! The context is rebuilt per request from the profile store; nothing is kept
//! in globals.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::access::phase::SessionPhase;
use crate::access::router::{authorize, Action, Module, RouteDecision, View};
use crate::errors::AppError;
use crate::models::profile::{Profile, Role};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityContext {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Option<Role>,
}

impl IdentityContext {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id,
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            role: profile.role_claim(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::for_role(self.role)
    }

    /// Gate for every protected handler.
    pub fn authorize(&self, module: Module, action: Action) -> Result<View, AppError> {
        match authorize(self.role, module, action) {
            RouteDecision::Render(view) => Ok(view),
            RouteDecision::Unauthorized => {
                warn!(
                    "User {} ({:?}) denied {action:?} on {module}",
                    self.user_id, self.role
                );
                Err(AppError::Forbidden)
            }
            RouteDecision::Reauthenticate => {
                warn!("User {} has no usable role claim", self.user_id);
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for IdentityContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let user_id = parts
            .headers
            .get(state.config.identity_header.as_str())
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(AppError::Unauthorized)?;

        let profile = state
            .directory
            .profile(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(IdentityContext::from_profile(&profile))
    }
}
