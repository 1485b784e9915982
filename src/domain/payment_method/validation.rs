//! Checkout input validation
//!
//! Turns raw card or wallet input into a storable [`PaymentInstrument`],
//! collecting every field-level failure instead of stopping at the first.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use utoipa::ToSchema;

use super::model::{PaymentInstrument, WalletProvider};
use crate::shared::types::FieldErrors;

/// Cards expiring further out than this are treated as malformed input.
pub const MAX_EXPIRY_YEARS_AHEAD: i32 = 20;

#[derive(Clone, Deserialize, ToSchema)]
pub struct CardInput {
    pub card_number: String,
    /// `MM/YY`
    pub expiry_date: String,
    pub cvc: String,
    pub cardholder_name: String,
}

impl std::fmt::Debug for CardInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardInput")
            .field("card_number", &"<redacted>")
            .field("expiry_date", &self.expiry_date)
            .field("cvc", &"<redacted>")
            .field("cardholder_name", &self.cardholder_name)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WalletInput {
    pub provider: WalletProvider,
    pub account_number: String,
}

/// New payment details entered at checkout
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum PaymentInput {
    Card(CardInput),
    MobileWallet(WalletInput),
}

impl PaymentInput {
    pub fn validate(&self, today: NaiveDate) -> Result<PaymentInstrument, FieldErrors> {
        match self {
            Self::Card(card) => validate_card(card, today),
            Self::MobileWallet(wallet) => validate_wallet(wallet),
        }
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse `MM/YY` into `(year, month)`.
fn parse_expiry(raw: &str) -> Option<(i32, u32)> {
    let (mm, yy) = raw.trim().split_once('/')?;
    if mm.len() != 2 || yy.len() != 2 || !all_digits(mm) || !all_digits(yy) {
        return None;
    }
    let month: u32 = mm.parse().ok()?;
    let year: i32 = yy.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((2000 + year, month))
}

pub fn validate_card(input: &CardInput, today: NaiveDate) -> Result<PaymentInstrument, FieldErrors> {
    let mut errors = FieldErrors::new();

    let number: String = input.card_number.chars().filter(|c| *c != ' ').collect();
    if number.len() != 16 || !all_digits(&number) {
        errors.push("card_number", "Card number must be 16 digits");
    }

    match parse_expiry(&input.expiry_date) {
        None => errors.push("expiry_date", "Expiry date must be in MM/YY format"),
        Some((year, month)) => {
            if (year, month) < (today.year(), today.month()) {
                errors.push("expiry_date", "Card has expired");
            } else if year > today.year() + MAX_EXPIRY_YEARS_AHEAD {
                errors.push("expiry_date", "Expiry date is not a valid card expiry");
            }
        }
    }

    let cvc = input.cvc.trim();
    if !(3..=4).contains(&cvc.len()) || !all_digits(cvc) {
        errors.push("cvc", "CVC must be 3 or 4 digits");
    }

    let name = input.cardholder_name.trim();
    if name.chars().count() < 2 {
        errors.push("cardholder_name", "Cardholder name is required");
    }

    errors.into_result()?;
    Ok(PaymentInstrument::Card {
        cardholder_name: name.to_string(),
        last4: number[number.len() - 4..].to_string(),
        expiry_date: input.expiry_date.trim().to_string(),
    })
}

/// Strip spaces and dashes from a mobile number.
pub fn normalize_account_number(raw: &str) -> String {
    raw.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// `01[3-9]` followed by eight digits.
pub fn is_valid_bd_mobile(number: &str) -> bool {
    let bytes = number.as_bytes();
    bytes.len() == 11
        && all_digits(number)
        && bytes[0] == b'0'
        && bytes[1] == b'1'
        && (b'3'..=b'9').contains(&bytes[2])
}

pub fn validate_wallet(input: &WalletInput) -> Result<PaymentInstrument, FieldErrors> {
    let number = normalize_account_number(&input.account_number);
    if !is_valid_bd_mobile(&number) {
        return Err(FieldErrors::single(
            "account_number",
            "Enter a valid 11-digit mobile number (01XXXXXXXXX)",
        ));
    }
    Ok(PaymentInstrument::MobileWallet {
        provider: input.provider,
        account_number: number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn card(number: &str, expiry: &str, cvc: &str, name: &str) -> CardInput {
        CardInput {
            card_number: number.into(),
            expiry_date: expiry.into(),
            cvc: cvc.into(),
            cardholder_name: name.into(),
        }
    }

    #[test]
    fn valid_card_keeps_only_last4() {
        let instrument =
            validate_card(&card("4242 4242 4242 1234", "08/27", "123", " John Doe "), today())
                .unwrap();
        assert_eq!(
            instrument,
            PaymentInstrument::Card {
                cardholder_name: "John Doe".into(),
                last4: "1234".into(),
                expiry_date: "08/27".into(),
            }
        );
    }

    #[test]
    fn card_errors_are_collected_per_field() {
        let errors = validate_card(&card("4242 4242", "13/27", "12", "J"), today()).unwrap_err();
        assert!(errors.has("card_number"));
        assert!(errors.has("expiry_date"));
        assert!(errors.has("cvc"));
        assert!(errors.has("cardholder_name"));
    }

    #[test]
    fn past_expiry_fails() {
        let errors =
            validate_card(&card("4242424242424242", "01/20", "123", "Jane"), today()).unwrap_err();
        assert!(errors.has("expiry_date"));
    }

    #[test]
    fn current_month_is_still_valid() {
        assert!(validate_card(&card("4242424242424242", "06/25", "1234", "Jane"), today()).is_ok());
        assert!(validate_card(&card("4242424242424242", "05/25", "1234", "Jane"), today()).is_err());
    }

    #[test]
    fn malformed_expiry_fails() {
        for expiry in ["12/99", "1/27", "12-27", "ab/cd", "00/27", "12/2027"] {
            let errors = validate_card(&card("4242424242424242", expiry, "123", "Jane"), today())
                .unwrap_err();
            assert!(errors.has("expiry_date"), "{expiry} should be rejected");
        }
    }

    #[test]
    fn wallet_numbers() {
        let ok = |n: &str| {
            validate_wallet(&WalletInput {
                provider: WalletProvider::BKash,
                account_number: n.into(),
            })
        };
        assert!(ok("01712345678").is_ok());
        assert!(ok("017-1234-5678").is_ok());
        assert!(ok("017 1234 5678").is_ok());
        assert!(ok("02712345678").is_err());
        assert!(ok("01212345678").is_err());
        assert!(ok("017123456").is_err());
        assert!(ok("0171234567a").is_err());
    }

    #[test]
    fn wallet_number_is_stored_normalized() {
        let instrument = validate_wallet(&WalletInput {
            provider: WalletProvider::Nagad,
            account_number: "018-1234-5678".into(),
        })
        .unwrap();
        assert_eq!(
            instrument,
            PaymentInstrument::MobileWallet {
                provider: WalletProvider::Nagad,
                account_number: "01812345678".into(),
            }
        );
    }

    #[test]
    fn debug_redacts_card_number() {
        let printed = format!("{:?}", card("4242424242424242", "08/27", "123", "Jane"));
        assert!(!printed.contains("4242424242424242"));
        assert!(!printed.contains("123\""));
    }
}
