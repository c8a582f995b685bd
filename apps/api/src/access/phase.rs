use serde::Serialize;
use thiserror::Error;

use crate::models::profile::Role;

/// Where a session stands with respect to identity.
///
/// `Admin` and `Student` hold until sign-out; switching between them always
/// goes back through `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Admin,
    Student,
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignInStarted,
    /// Identity loading finished with this role claim (or none).
    RoleResolved(Option<Role>),
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot apply {event:?} in phase {phase:?}")]
pub struct TransitionError {
    pub phase: SessionPhase,
    pub event: SessionEvent,
}

impl SessionPhase {
    /// Phase of an already-resolved identity.
    pub fn for_role(role: Option<Role>) -> SessionPhase {
        match role {
            Some(Role::Admin) => SessionPhase::Admin,
            Some(Role::Student) => SessionPhase::Student,
            None => SessionPhase::Unauthorized,
        }
    }

    pub fn on(self, event: SessionEvent) -> Result<SessionPhase, TransitionError> {
        use SessionEvent::*;
        use SessionPhase::*;

        match (self, event) {
            (_, SignedOut) => Ok(Unauthenticated),
            (Unauthenticated | Unauthorized, SignInStarted) => Ok(Authenticating),
            (Authenticating, RoleResolved(role)) => Ok(SessionPhase::for_role(role)),
            (phase, event) => Err(TransitionError { phase, event }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Admin | SessionPhase::Student)
    }
}
