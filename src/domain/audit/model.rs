use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Login,
    Logout,
    ReservationCreated,
    ReservationExtended,
    ReservationEnded,
    PaymentMethodAdded,
    PaymentMethodRemoved,
    SlotCreated,
    SlotUpdated,
    SlotDeleted,
    SlotStatusChanged,
    UserRoleChanged,
    CurrencyUpdated,
}

impl ActionType {
    pub const ALL: [ActionType; 13] = [
        Self::Login,
        Self::Logout,
        Self::ReservationCreated,
        Self::ReservationExtended,
        Self::ReservationEnded,
        Self::PaymentMethodAdded,
        Self::PaymentMethodRemoved,
        Self::SlotCreated,
        Self::SlotUpdated,
        Self::SlotDeleted,
        Self::SlotStatusChanged,
        Self::UserRoleChanged,
        Self::CurrencyUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::ReservationCreated => "RESERVATION_CREATED",
            Self::ReservationExtended => "RESERVATION_EXTENDED",
            Self::ReservationEnded => "RESERVATION_ENDED",
            Self::PaymentMethodAdded => "PAYMENT_METHOD_ADDED",
            Self::PaymentMethodRemoved => "PAYMENT_METHOD_REMOVED",
            Self::SlotCreated => "SLOT_CREATED",
            Self::SlotUpdated => "SLOT_UPDATED",
            Self::SlotDeleted => "SLOT_DELETED",
            Self::SlotStatusChanged => "SLOT_STATUS_CHANGED",
            Self::UserRoleChanged => "USER_ROLE_CHANGED",
            Self::CurrencyUpdated => "CURRENCY_UPDATED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether an actor with `role` gets a transient notification for `action`.
///
/// USER: own session, reservation and payment actions. ADMIN: slot
/// management. SUPER_ADMIN: everything.
pub fn is_visible_to(role: UserRole, action: ActionType) -> bool {
    use ActionType::*;
    match role {
        UserRole::SuperAdmin => true,
        UserRole::Admin => matches!(
            action,
            SlotCreated | SlotUpdated | SlotDeleted | SlotStatusChanged
        ),
        UserRole::User => matches!(
            action,
            Login
                | Logout
                | ReservationCreated
                | ReservationExtended
                | ReservationEnded
                | PaymentMethodAdded
                | PaymentMethodRemoved
        ),
    }
}

/// Append-only audit entry. `actor_id`/`actor_role` are `None` for actions
/// taken by the service itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<UserRole>,
    pub action_type: ActionType,
    pub details: String,
    pub metadata: serde_json::Value,
}

impl SystemLog {
    pub fn new(
        actor_id: Option<Uuid>,
        actor_role: Option<UserRole>,
        action_type: ActionType,
        details: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            actor_role,
            action_type,
            details: details.into(),
            metadata,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<UserRole>,
    pub action_type: Option<ActionType>,
}

impl LogFilter {
    pub fn matches(&self, log: &SystemLog) -> bool {
        self.actor_id.map_or(true, |id| log.actor_id == Some(id))
            && self.actor_role.map_or(true, |r| log.actor_role == Some(r))
            && self.action_type.map_or(true, |a| log.action_type == a)
    }
}
