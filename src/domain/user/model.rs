use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::DomainResult;
use crate::shared::types::DomainError;

/// User role as carried in the auth provider's role claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            "SUPER_ADMIN" | "SUPERADMIN" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Admins and super-admins manage slots and see every reservation.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn require_staff(&self) -> DomainResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("admin role required".into()))
        }
    }

    pub fn require_super_admin(&self) -> DomainResult<()> {
        if self.role == UserRole::SuperAdmin {
            Ok(())
        } else {
            Err(DomainError::Forbidden("super-admin role required".into()))
        }
    }

    /// Owner of a resource, or staff.
    pub fn can_act_for(&self, owner: Uuid) -> bool {
        self.id == owner || self.role.is_staff()
    }
}

/// Fails with `UserNotAuthenticated` when there is no session.
pub fn require_user(user: Option<&CurrentUser>) -> DomainResult<&CurrentUser> {
    user.ok_or(DomainError::UserNotAuthenticated)
}

/// Profile row mirrored from the auth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_session(user: &CurrentUser, now: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: now,
            last_seen_at: now,
        }
    }
}
