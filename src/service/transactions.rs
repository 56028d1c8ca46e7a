//! Transaction history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FinanceApi, ServiceError};
use crate::domain::{
    PartyType, TransactionCategory, TransactionDirection, TransactionStatus, TransactionType,
};
use crate::http::Transport;
use crate::validation::{Boundary, Validate, ValidationError, Validator};

/// One side of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInfo {
    /// Kind of party.
    #[serde(rename = "type")]
    pub kind: PartyType,
    /// Holder name.
    #[serde(default)]
    pub name: Option<String>,
    /// Merchant name.
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// Masked card number.
    #[serde(default)]
    pub card_number: Option<String>,
}

/// A card transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id.
    pub id: String,
    /// Owner id.
    pub user_id: String,
    /// Amount, always positive; see `transaction_direction`.
    pub amount: f64,
    /// Currency code.
    pub currency: String,
    /// Merchant label.
    pub merchant: String,
    /// Booking date.
    pub date: String,
    /// Spending category.
    pub category: TransactionCategory,
    /// Card the transaction belongs to.
    pub card_id: String,
    /// Gateway status.
    pub status: TransactionStatus,
    /// Gateway id.
    pub external_id: String,
    /// Kind of transaction.
    pub transaction_type: TransactionType,
    /// Direction of money flow.
    pub transaction_direction: TransactionDirection,
    /// Fee charged.
    pub fee: f64,
    /// Processing timestamp.
    pub processed_at: String,
    /// Sender.
    pub sender_info: PartyInfo,
    /// Receiver.
    pub receiver_info: PartyInfo,
    /// Free-form gateway metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Gateway name.
    pub gateway: String,
    /// Retrieval reference number.
    pub rrn: String,
    /// Description.
    pub description: String,
    /// Whether the transaction repeats.
    pub is_recurring: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl Transaction {
    /// Amount with the sign of its direction: negative for outgoing money.
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_direction {
            TransactionDirection::Incoming => self.amount,
            TransactionDirection::Outgoing => -self.amount,
        }
    }
}

impl Validate for Transaction {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .require_non_empty("id", &self.id)
            .non_negative("amount", self.amount)
            .non_negative("fee", self.fee)
            .finish()
    }
}

/// Transaction endpoints, borrowed from a [`FinanceApi`].
#[derive(Debug)]
pub struct TransactionsService<'a, T> {
    api: &'a FinanceApi<T>,
}

impl<'a, T> TransactionsService<'a, T> {
    pub(super) const fn new(api: &'a FinanceApi<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> TransactionsService<'_, T> {
    /// `GET /api/transactions/?username=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn list(&self, username: Option<&str>) -> Result<Vec<Transaction>, ServiceError> {
        let username = self.api.username(username);
        self.api
            .get("/api/transactions/", &[], &[("username", username)])
            .await
    }
}
