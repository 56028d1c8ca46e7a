//! Typed service layer over the finance backend.
//!
//! Each service validates its request body before sending, calls
//! [`ApiClient::perform`], then decodes and validates the envelope's `data`.
//! Failures are reported as [`ServiceError`], which keeps API failures apart
//! from validation failures.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use moliyachi_client::config::ClientConfig;
//! use moliyachi_client::domain::Language;
//! use moliyachi_client::request::RequestRegistry;
//! use moliyachi_client::service::FinanceApi;
//!
//! # async fn example() -> Result<(), moliyachi_client::service::ServiceError> {
//! let api = FinanceApi::from_config(&ClientConfig::default(), Arc::new(RequestRegistry::new()));
//!
//! let dashboard = api.dashboard().overview(None).await?;
//! let insights = api.dashboard().insights(None, Language::Uz).await?;
//! println!("health {} / {} insights", dashboard.health_score.score, insights.insights.len());
//! # Ok(())
//! # }
//! ```

mod cards;
mod dashboard;
mod goals;
mod shop;
mod transactions;
mod users;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::domain::Language;
use crate::http::{ApiClient, ApiError, ReqwestTransport, RequestOptions, Transport};
use crate::request::RequestRegistry;
use crate::validation::{Boundary, Validate, ValidationError};

pub use cards::{Card, CardsService, CreateCardBody};
pub use dashboard::{
    DashboardData, DashboardInsights, DashboardService, GoalInsights, HealthScore,
    SpendingSummary,
};
pub use goals::{
    CreateGoalBody, Goal, GoalRecommendations, GoalTimeline, GoalsService, MonteCarloResults,
    ProductRecommendation, TimelineInterpretation, TimelinePoint, UpdateGoalBody,
};
pub use shop::{ShopProduct, ShopSearchBody, ShopSearchResult, ShopService};
pub use transactions::{PartyInfo, Transaction, TransactionsService};
pub use users::{UpdateUserBody, User, UserCard, UsersService};

// =============================================================================
// Service Error
// =============================================================================

/// Failure of a typed service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The backend call failed (transport, HTTP, envelope, cancelled).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A request body or response payload broke a field rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ServiceError {
    /// `true` when the underlying call was cancelled, which callers treat as
    /// "no update" rather than an error to display.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Api(error) if error.is_cancelled())
    }

    /// The underlying API error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            Self::Validation(_) => None,
        }
    }

    /// The underlying validation error, if any.
    #[must_use]
    pub const fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Self::Api(_) => None,
            Self::Validation(error) => Some(error),
        }
    }
}

// =============================================================================
// Finance API
// =============================================================================

/// Entry point of the typed service layer.
#[derive(Debug)]
pub struct FinanceApi<T> {
    client: ApiClient<T>,
    default_username: String,
}

impl FinanceApi<ReqwestTransport> {
    /// Builds a reqwest-backed API from configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig, registry: Arc<RequestRegistry>) -> Self {
        Self::new(
            ApiClient::from_config(config, registry),
            config.default_username.clone(),
        )
    }
}

impl<T: Transport> FinanceApi<T> {
    /// Wraps a client; `default_username` fills in calls that name no user.
    #[must_use]
    pub fn new(client: ApiClient<T>, default_username: impl Into<String>) -> Self {
        Self {
            client,
            default_username: default_username.into(),
        }
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    /// Username used when a call does not name one.
    #[must_use]
    pub fn default_username(&self) -> &str {
        &self.default_username
    }

    /// Card endpoints.
    #[must_use]
    pub const fn cards(&self) -> CardsService<'_, T> {
        CardsService::new(self)
    }

    /// Goal endpoints.
    #[must_use]
    pub const fn goals(&self) -> GoalsService<'_, T> {
        GoalsService::new(self)
    }

    /// Transaction endpoints.
    #[must_use]
    pub const fn transactions(&self) -> TransactionsService<'_, T> {
        TransactionsService::new(self)
    }

    /// User endpoints.
    #[must_use]
    pub const fn users(&self) -> UsersService<'_, T> {
        UsersService::new(self)
    }

    /// Dashboard endpoints.
    #[must_use]
    pub const fn dashboard(&self) -> DashboardService<'_, T> {
        DashboardService::new(self)
    }

    /// Shop search endpoint.
    #[must_use]
    pub const fn shop(&self) -> ShopService<'_, T> {
        ShopService::new(self)
    }

    fn username<'a>(&'a self, username: Option<&'a str>) -> &'a str {
        username
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.default_username)
    }

    async fn fetch<D>(&self, path: &str, options: RequestOptions) -> Result<D, ServiceError>
    where
        D: DeserializeOwned + Validate,
    {
        let envelope = self.client.perform(path, options).await?;
        decode_data(envelope.data)
    }

    async fn get<D>(
        &self,
        path: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<D, ServiceError>
    where
        D: DeserializeOwned + Validate,
    {
        let options = query.iter().fold(
            with_segments(RequestOptions::get(), segments),
            |options, (name, value)| options.with_query(*name, *value),
        );
        self.fetch(path, options).await
    }

    async fn send<B, D>(
        &self,
        method: reqwest::Method,
        path: &str,
        segments: &[&str],
        body: &B,
    ) -> Result<D, ServiceError>
    where
        B: Serialize + Validate,
        D: DeserializeOwned + Validate,
    {
        body.validate(Boundary::Request)?;
        let json = serde_json::to_string(body)
            .map_err(|error| ValidationError::single(Boundary::Request, "body", error.to_string()))?;
        let options = with_segments(RequestOptions::new(method), segments).with_body(json);
        self.fetch(path, options).await
    }
}

fn decode_data<D>(data: serde_json::Value) -> Result<D, ServiceError>
where
    D: DeserializeOwned + Validate,
{
    let payload: D =
        serde_json::from_value(data).map_err(|error| ValidationError::undecodable(&error))?;
    payload.validate(Boundary::Response)?;
    Ok(payload)
}

fn language_query(language: Language) -> (&'static str, &'static str) {
    ("language", language.as_str())
}

fn with_segments(options: RequestOptions, segments: &[&str]) -> RequestOptions {
    segments
        .iter()
        .fold(options, |options, segment| options.with_segment(*segment))
}
