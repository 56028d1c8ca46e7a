//! AI shop search.

use serde::{Deserialize, Serialize};

use super::{FinanceApi, ServiceError};
use crate::http::Transport;
use crate::validation::{Boundary, Validate, ValidationError, Validator};

/// Body of `POST /api/shop/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSearchBody {
    /// Free-text query in any supported language.
    pub query: String,
}

impl ShopSearchBody {
    /// Creates a search body.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl Validate for ShopSearchBody {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .check(!self.query.is_empty(), "query", "Query is required")
            .finish()
    }
}

/// A product offered with installment pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopProduct {
    /// Number of offers for the product.
    pub all_count: u64,
    /// Product id.
    pub id: u64,
    /// Image URL.
    pub image: String,
    /// Product name.
    pub name: String,
    /// Installment term, e.g. `12 months`.
    pub opencard_month_text: String,
    /// Monthly installment.
    pub opencard_monthly_payment: f64,
    /// Total price on installments.
    pub opencard_total_price: f64,
    /// Product page.
    pub product_url: String,
}

impl Validate for ShopProduct {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .http_url("image", &self.image)
            .http_url("product_url", &self.product_url)
            .non_negative("opencard_monthly_payment", self.opencard_monthly_payment)
            .non_negative("opencard_total_price", self.opencard_total_price)
            .finish()
    }
}

/// `data` of `POST /api/shop/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSearchResult {
    /// Generated buying advice.
    pub insight: String,
    /// Matching products.
    pub products: Vec<ShopProduct>,
    /// Number of products returned.
    pub shown: u64,
    /// Number of products found.
    pub total_found: u64,
    /// Query as sent to the catalogue.
    pub translated_query: String,
    /// Query as typed by the user.
    pub user_query: String,
}

impl Validate for ShopSearchResult {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .nested("products", &self.products)
            .finish()
    }
}

/// Shop search, borrowed from a [`FinanceApi`].
#[derive(Debug)]
pub struct ShopService<'a, T> {
    api: &'a FinanceApi<T>,
}

impl<'a, T> ShopService<'a, T> {
    pub(super) const fn new(api: &'a FinanceApi<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> ShopService<'_, T> {
    /// `POST /api/shop/search`
    ///
    /// # Errors
    ///
    /// Returns a request-side [`ServiceError::Validation`] ("Query is
    /// required") without calling the backend when the query is empty.
    pub async fn search(&self, body: &ShopSearchBody) -> Result<ShopSearchResult, ServiceError> {
        self.api
            .send(reqwest::Method::POST, "/api/shop/search", &[], body)
            .await
    }
}
