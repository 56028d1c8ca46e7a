//! Card endpoints.

use serde::{Deserialize, Serialize};

use super::{FinanceApi, ServiceError};
use crate::domain::CardType;
use crate::http::Transport;
use crate::validation::{Boundary, Validate, ValidationError, Validator};

/// A payment card owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Card id.
    pub id: String,
    /// Owner id.
    pub user_id: String,
    /// Display name.
    pub card_name: String,
    /// Masked card number.
    pub card_number: String,
    /// Current balance.
    pub balance: f64,
    /// Currency code.
    pub currency: String,
    /// Card network.
    pub card_type: CardType,
    /// Expiry, as sent by the backend.
    pub expiration_date: String,
    /// Soft-delete flag.
    pub is_removed: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl Validate for Card {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .require_non_empty("id", &self.id)
            .require_non_empty("card_number", &self.card_number)
            .finish()
    }
}

/// Body of `POST /api/cards/`.
///
/// A `None` username is replaced by the configured default user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCardBody {
    /// Owner; defaults to the configured user.
    pub username: Option<String>,
    /// Display name.
    pub card_name: String,
    /// Card number.
    pub card_number: String,
    /// Opening balance.
    pub balance: f64,
    /// Currency code.
    pub currency: String,
    /// Card network.
    pub card_type: CardType,
    /// Expiry, e.g. `12/27`.
    pub expiration_date: String,
}

impl Validate for CreateCardBody {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .require_non_empty("card_name", &self.card_name)
            .require_non_empty("card_number", &self.card_number)
            .non_negative("balance", self.balance)
            .require_non_empty("currency", &self.currency)
            .require_non_empty("expiration_date", &self.expiration_date)
            .finish()
    }
}

/// Card endpoints, borrowed from a [`FinanceApi`].
#[derive(Debug)]
pub struct CardsService<'a, T> {
    api: &'a FinanceApi<T>,
}

impl<'a, T> CardsService<'a, T> {
    pub(super) const fn new(api: &'a FinanceApi<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> CardsService<'_, T> {
    /// `GET /api/cards/?username=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn list(&self, username: Option<&str>) -> Result<Vec<Card>, ServiceError> {
        let username = self.api.username(username);
        self.api.get("/api/cards/", &[], &[("username", username)]).await
    }

    /// `GET /api/cards/{card_id}`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn get(&self, card_id: &str) -> Result<Card, ServiceError> {
        self.api
            .get("/api/cards", &[card_id], &[])
            .await
    }

    /// `POST /api/cards/`
    ///
    /// # Errors
    ///
    /// Returns a request-side [`ServiceError::Validation`] without calling the
    /// backend when the body is invalid.
    pub async fn create(&self, mut body: CreateCardBody) -> Result<Card, ServiceError> {
        if body.username.as_deref().is_none_or(|name| name.trim().is_empty()) {
            body.username = Some(self.api.default_username().to_string());
        }
        self.api.send(reqwest::Method::POST, "/api/cards/", &[], &body).await
    }
}
