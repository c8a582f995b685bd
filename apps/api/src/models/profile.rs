use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role claim attached to an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }

    /// Parses a role claim. Anything other than the two known tokens is no claim at all.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim() {
            "admin" => Some(Role::Admin),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity-scoped profile, provisioned by the authentication provider.
///
/// `role` is kept as the raw stored claim; use [`Profile::role_claim`] to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn role_claim(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Display fields of a profile, as joined onto student listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub full_name: String,
    pub email: String,
}

impl ProfileSummary {
    /// Placeholder paired with a student whose profile row is missing.
    pub fn unknown() -> Self {
        Self {
            full_name: "Unknown".to_string(),
            email: "Unknown".to_string(),
        }
    }
}

/// Provisioning payload handed over by the identity provider on sign-in.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_known_tokens() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" student "), Some(Role::Student));
    }

    #[test]
    fn test_role_parse_rejects_unknown_and_empty() {
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("recruiter"), None);
    }

    #[test]
    fn test_unknown_summary_is_sentinel() {
        let s = ProfileSummary::unknown();
        assert_eq!(s.full_name, "Unknown");
        assert_eq!(s.email, "Unknown");
    }
}
