//! Shared enumerations of the finance domain.
//!
//! The wire spelling of every variant matches the backend exactly, including
//! spaces and ampersands (`"Gifts & Donations"`, `"Super Admin"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Payment card network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Uzcard.
    Uzcard,
    /// Humo.
    Humo,
    /// Visa.
    Visa,
    /// Mastercard.
    Mastercard,
}

/// Savings goal priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalPriority {
    /// Low.
    Low,
    /// Medium, the default for new goals.
    #[default]
    Medium,
    /// High.
    High,
}

/// Savings goal lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalStatus {
    /// Still being saved for. The default for new goals.
    #[default]
    Active,
    /// Reached.
    Achieved,
    /// Abandoned.
    Cancelled,
}

/// Kind of party on either side of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyType {
    /// A payment card.
    Card,
    /// A wallet.
    Wallet,
    /// A merchant.
    Merchant,
    /// A bank account.
    BankAccount,
}

/// Spending category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum TransactionCategory {
    Food,
    Transportation,
    Shopping,
    Entertainment,
    Healthcare,
    Services,
    Housing,
    Utilities,
    Education,
    #[serde(rename = "Gifts & Donations")]
    GiftsAndDonations,
    Insurance,
    Income,
    Transfer,
    Other,
}

/// Direction of money flow relative to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionDirection {
    /// Money leaving the user.
    Outgoing,
    /// Money reaching the user.
    Incoming,
}

/// Processing status reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum TransactionStatus {
    Approved,
    Declined,
    Pending,
    Canceled,
    Voided,
    Settled,
    Refunded,
    Success,
}

/// Kind of transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum TransactionType {
    #[serde(rename = "P2P_TRANSFER")]
    P2pTransfer,
    #[serde(rename = "P2M_PAYMENT")]
    P2mPayment,
    WalletTopup,
    WalletPayout,
    Refund,
    Reversal,
    AtmWithdrawal,
}

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// A regular customer.
    Client,
    /// An administrator.
    Admin,
    /// An administrator with every permission.
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

/// Supported currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Uzbek som, the default.
    #[default]
    Uzs,
    /// US dollar.
    Usd,
}

// =============================================================================
// Language
// =============================================================================

/// Language of generated text (insights, interpretations, chat answers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English, the default.
    #[default]
    En,
    /// Uzbek.
    Uz,
    /// Russian.
    Ru,
}

impl Language {
    /// The code sent as the `language` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Uz => "uz",
            Self::Ru => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported language code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}', expected one of en, uz, ru")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "uz" => Ok(Self::Uz),
            "ru" => Ok(Self::Ru),
            _ => Err(UnknownLanguage(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("Gifts & Donations"), TransactionCategory::GiftsAndDonations)]
    #[case(json!("Food"), TransactionCategory::Food)]
    fn test_category_wire_names(#[case] wire: serde_json::Value, #[case] expected: TransactionCategory) {
        assert_eq!(serde_json::from_value::<TransactionCategory>(wire.clone()).unwrap(), expected);
        assert_eq!(serde_json::to_value(expected).unwrap(), wire);
    }

    #[rstest]
    #[case(json!("P2P_TRANSFER"), TransactionType::P2pTransfer)]
    #[case(json!("P2M_PAYMENT"), TransactionType::P2mPayment)]
    #[case(json!("ATM_WITHDRAWAL"), TransactionType::AtmWithdrawal)]
    fn test_transaction_type_wire_names(#[case] wire: serde_json::Value, #[case] expected: TransactionType) {
        assert_eq!(serde_json::from_value::<TransactionType>(wire.clone()).unwrap(), expected);
        assert_eq!(serde_json::to_value(expected).unwrap(), wire);
    }

    #[rstest]
    fn test_other_wire_names() {
        assert_eq!(serde_json::to_value(UserRole::SuperAdmin).unwrap(), json!("Super Admin"));
        assert_eq!(serde_json::to_value(PartyType::BankAccount).unwrap(), json!("BANK_ACCOUNT"));
        assert_eq!(serde_json::to_value(Currency::Uzs).unwrap(), json!("UZS"));
        assert_eq!(serde_json::to_value(TransactionDirection::Incoming).unwrap(), json!("INCOMING"));
        assert!(serde_json::from_value::<CardType>(json!("Amex")).is_err());
    }

    #[rstest]
    #[case("en", Language::En)]
    #[case(" RU ", Language::Ru)]
    #[case("uz", Language::Uz)]
    fn test_language_from_str(#[case] raw: &str, #[case] expected: Language) {
        assert_eq!(raw.parse::<Language>(), Ok(expected));
    }

    #[rstest]
    fn test_language_rejects_unknown() {
        assert_eq!(
            "de".parse::<Language>(),
            Err(UnknownLanguage("de".to_string()))
        );
    }
}
