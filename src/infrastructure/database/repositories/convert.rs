//! Column conversions shared by the SeaORM repositories

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::domain::DomainError;

pub(super) fn db_err(e: DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

pub(super) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// A stored value that no longer parses.
pub(super) fn corrupt(column: &str, value: &str) -> DomainError {
    DomainError::Storage(format!("Corrupt value in column {}: {:?}", column, value))
}

pub(super) fn parse_uuid(column: &str, value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|_| corrupt(column, value))
}

pub(super) fn parse_decimal(column: &str, value: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(value).map_err(|_| corrupt(column, value))
}

pub(super) fn parse_json<T: serde::de::DeserializeOwned>(
    column: &str,
    value: &str,
) -> Result<T, DomainError> {
    serde_json::from_str(value).map_err(|_| corrupt(column, value))
}

pub(super) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| DomainError::Storage(e.to_string()))
}
