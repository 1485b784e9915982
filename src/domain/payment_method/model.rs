use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum WalletProvider {
    #[serde(rename = "bKash")]
    BKash,
    Nagad,
    Rocket,
}

impl WalletProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BKash => "bKash",
            Self::Nagad => "Nagad",
            Self::Rocket => "Rocket",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bKash" => Some(Self::BKash),
            "Nagad" => Some(Self::Nagad),
            "Rocket" => Some(Self::Rocket),
            _ => None,
        }
    }
}

/// A stored instrument. Only display-safe fields are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum PaymentInstrument {
    Card {
        cardholder_name: String,
        last4: String,
        /// `MM/YY`
        expiry_date: String,
    },
    MobileWallet {
        provider: WalletProvider,
        /// 11 digits, separators stripped
        account_number: String,
    },
}

impl PaymentInstrument {
    /// Key under which two instruments of one user count as the same method.
    ///
    /// Cards compare by last four digits and case-insensitive cardholder
    /// name; wallets by provider and account number.
    pub fn identity_key(&self) -> String {
        match self {
            Self::Card {
                cardholder_name,
                last4,
                ..
            } => format!("card:{}:{}", last4, cardholder_name.trim().to_lowercase()),
            Self::MobileWallet {
                provider,
                account_number,
            } => format!("wallet:{}:{}", provider.as_str(), account_number),
        }
    }

    /// Label stored on reservations and shown in logs.
    pub fn label(&self) -> String {
        match self {
            Self::Card { last4, .. } => format!("Card •••• {}", last4),
            Self::MobileWallet {
                provider,
                account_number,
            } => {
                let tail = &account_number[account_number.len().saturating_sub(4)..];
                format!("{} •••• {}", provider.as_str(), tail)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Card { .. } => "Card",
            Self::MobileWallet { provider, .. } => provider.as_str(),
        }
    }
}

/// An instrument saved to a user's vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub instrument: PaymentInstrument,
    pub created_at: DateTime<Utc>,
}

impl SavedPaymentMethod {
    pub fn new(user_id: Uuid, instrument: PaymentInstrument) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            instrument,
            created_at: Utc::now(),
        }
    }

    pub fn is_same_method(&self, other: &PaymentInstrument) -> bool {
        self.instrument.identity_key() == other.identity_key()
    }
}
