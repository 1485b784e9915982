//! Payment method vault aggregate
//!
//! Saved cards and mobile-wallet accounts. Raw card numbers and CVCs are
//! validated in [`validation`] and never leave it.

pub mod model;
pub mod repository;
pub mod validation;

pub use model::{PaymentInstrument, SavedPaymentMethod, WalletProvider};
pub use repository::PaymentMethodRepository;
pub use validation::{CardInput, PaymentInput, WalletInput};
