//! Settings DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetCurrencyRequest {
    /// ISO-4217 style code, e.g. `BDT`
    #[validate(length(equal = 3, message = "must be a 3-letter code"))]
    pub code: String,
    #[validate(length(min = 1, max = 5, message = "must be 1 to 5 characters"))]
    pub symbol: String,
}
