use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::types::FieldErrors;

/// Display currency for prices and totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CurrencySettings {
    /// ISO-4217 code
    pub code: String,
    pub symbol: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl CurrencySettings {
    pub fn new(code: &str, symbol: &str, updated_by: Option<Uuid>) -> Result<Self, FieldErrors> {
        let code = code.trim().to_string();
        let symbol = symbol.trim().to_string();

        let mut errors = FieldErrors::new();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            errors.push("code", "must be three upper-case letters");
        }
        if symbol.is_empty() || symbol.chars().count() > 5 {
            errors.push("symbol", "must be 1 to 5 characters");
        }
        errors.into_result()?;

        Ok(Self {
            code,
            symbol,
            updated_at: Utc::now(),
            updated_by,
        })
    }

    /// Presentation only: rounds half away from zero to two decimals.
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{}{:.2}", self.symbol, rounded)
    }
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            code: "BDT".into(),
            symbol: "৳".into(),
            updated_at: Utc::now(),
            updated_by: None,
        }
    }
}
