//! Goal endpoints, including the Monte Carlo timeline and the LLM-backed
//! interpretation and product recommendations.

use serde::{Deserialize, Serialize};

use super::{FinanceApi, ServiceError, language_query};
use crate::domain::{Currency, GoalPriority, GoalStatus, Language};
use crate::http::Transport;
use crate::validation::{Boundary, Validate, ValidationError, Validator};

// =============================================================================
// Goal
// =============================================================================

/// A savings goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Goal id.
    pub id: String,
    /// Owner id.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Amount to reach.
    pub target_amount: f64,
    /// Amount saved so far.
    pub current_amount: f64,
    /// Currency code.
    pub currency: String,
    /// Target date, as sent by the backend.
    pub target_date: String,
    /// Lifecycle status.
    pub status: GoalStatus,
    /// Priority.
    pub priority: GoalPriority,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Progress in percent, when computed by the backend.
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    /// Estimated months to completion, when computed by the backend.
    #[serde(default)]
    pub estimated_months: Option<f64>,
}

impl Goal {
    /// Progress in whole percent, clamped to `0..=100`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped to 0..=100
    pub fn progress_percent(&self) -> u8 {
        if self.target_amount <= 0.0 {
            return 0;
        }
        (self.current_amount / self.target_amount * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8
    }
}

impl Validate for Goal {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .require_non_empty("id", &self.id)
            .require_non_empty("name", &self.name)
            .non_negative("target_amount", self.target_amount)
            .non_negative("current_amount", self.current_amount)
            .finish()
    }
}

/// Body of `POST /api/goals/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalBody {
    /// Owner id.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Amount to reach.
    pub target_amount: f64,
    /// Amount already saved.
    pub current_amount: f64,
    /// Currency.
    pub currency: Currency,
    /// Target date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    /// Initial status.
    pub status: GoalStatus,
    /// Priority.
    pub priority: GoalPriority,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateGoalBody {
    /// A new goal with nothing saved yet, in UZS, active and of medium priority.
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            target_amount,
            current_amount: 0.0,
            currency: Currency::default(),
            target_date: None,
            status: GoalStatus::default(),
            priority: GoalPriority::default(),
            description: None,
        }
    }
}

impl Validate for CreateGoalBody {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .require_non_empty("user_id", &self.user_id)
            .require_non_empty("name", &self.name)
            .positive("target_amount", self.target_amount)
            .non_negative("current_amount", self.current_amount)
            .finish()
    }
}

/// Body of `PUT /api/goals/`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateGoalBody {
    /// Goal to update.
    pub goal_id: String,
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<f64>,
    /// New saved amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_amount: Option<f64>,
    /// New currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    /// New target date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    /// New status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GoalStatus>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<GoalPriority>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for UpdateGoalBody {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        let validator = Validator::new(boundary).require_non_empty("goal_id", &self.goal_id);
        let validator = match &self.name {
            Some(name) => validator.require_non_empty("name", name),
            None => validator,
        };
        validator
            .check(
                self.target_amount
                    .is_none_or(|amount| amount.is_finite() && amount > 0.0),
                "target_amount",
                "target_amount must be greater than zero",
            )
            .non_negative_opt("current_amount", self.current_amount)
            .finish()
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// Percentiles of the Monte Carlo simulation, in months.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResults {
    /// Optimistic scenario.
    #[serde(default)]
    pub p10: Option<f64>,
    /// Median scenario.
    #[serde(default)]
    pub p50: Option<f64>,
    /// Pessimistic scenario.
    #[serde(default)]
    pub p90: Option<f64>,
    /// Success probability, when nested here by the backend.
    #[serde(default)]
    pub success_probability: Option<f64>,
    /// Deterministic estimate, when nested here by the backend.
    #[serde(default)]
    pub deterministic_months: Option<f64>,
}

/// Projected savings for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Month number, starting at 0.
    pub month: u32,
    /// Projection at the average savings rate.
    pub deterministic: f64,
    /// Optimistic projection.
    pub p10_optimistic: f64,
    /// Median projection.
    pub p50_median: f64,
    /// Pessimistic projection.
    pub p90_pessimistic: f64,
}

/// `data` of `GET /api/goals/{id}/timeline`.
///
/// The backend has shipped the simulation under both `monte_carlo` and
/// `monte_carlo_results`; both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalTimeline {
    /// Top-level success probability in percent.
    #[serde(default)]
    pub success_probability: Option<f64>,
    /// Top-level deterministic estimate in months.
    #[serde(default)]
    pub deterministic_months: Option<f64>,
    /// Monthly contribution after deductions.
    #[serde(default)]
    pub real_monthly_contribution: Option<f64>,
    /// Simulation percentiles.
    #[serde(default, alias = "monte_carlo")]
    pub monte_carlo_results: Option<MonteCarloResults>,
    /// Points for the projection chart.
    #[serde(default)]
    pub timeline_data: Vec<TimelinePoint>,
}

impl GoalTimeline {
    /// Success probability, preferring the top-level value.
    #[must_use]
    pub fn success_probability(&self) -> Option<f64> {
        self.success_probability.or_else(|| {
            self.monte_carlo_results
                .as_ref()
                .and_then(|results| results.success_probability)
        })
    }

    /// Months to completion: the deterministic estimate, else the median.
    #[must_use]
    pub fn projected_months(&self) -> Option<f64> {
        let nested = self.monte_carlo_results.as_ref();
        self.deterministic_months
            .or_else(|| nested.and_then(|results| results.deterministic_months))
            .or_else(|| nested.and_then(|results| results.p50))
    }
}

impl Validate for GoalTimeline {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        let probability = self.success_probability();
        Validator::new(boundary)
            .check(
                probability.is_none_or(|value| (0.0..=100.0).contains(&value)),
                "success_probability",
                "success_probability must be between 0 and 100",
            )
            .non_negative_opt("deterministic_months", self.deterministic_months)
            .finish()
    }
}

/// `data` of `GET /api/goals/{id}/timeline/interpretation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineInterpretation {
    /// Generated text; absent when the model produced nothing.
    #[serde(default)]
    pub interpretation: Option<String>,
}

impl Validate for TimelineInterpretation {
    fn validate(&self, _boundary: Boundary) -> Result<(), ValidationError> {
        Ok(())
    }
}

// =============================================================================
// Recommendations
// =============================================================================

/// One recommended bank product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecommendation {
    /// Product name.
    pub product_name: String,
    /// Catalogue id.
    #[serde(default)]
    pub product_id: Option<String>,
    /// Why it helps this goal.
    #[serde(default)]
    pub reason: Option<String>,
    /// Expected benefit.
    #[serde(default)]
    pub benefit: Option<String>,
    /// Product category.
    #[serde(default)]
    pub category: Option<String>,
    /// Product kind (`savings`, `debit`, ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Product page.
    #[serde(default)]
    pub link: Option<String>,
}

impl Validate for ProductRecommendation {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        let validator =
            Validator::new(boundary).require_non_empty("product_name", &self.product_name);
        let validator = match &self.link {
            Some(link) => validator.http_url("link", link),
            None => validator,
        };
        validator.finish()
    }
}

/// `data` of `GET /api/goals/{id}/recommendations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalRecommendations {
    /// Zero to three products.
    #[serde(default)]
    pub recommendations: Vec<ProductRecommendation>,
}

impl Validate for GoalRecommendations {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .nested("recommendations", &self.recommendations)
            .finish()
    }
}

// =============================================================================
// Service
// =============================================================================

/// Goal endpoints, borrowed from a [`FinanceApi`].
#[derive(Debug)]
pub struct GoalsService<'a, T> {
    api: &'a FinanceApi<T>,
}

impl<'a, T> GoalsService<'a, T> {
    pub(super) const fn new(api: &'a FinanceApi<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> GoalsService<'_, T> {
    /// `GET /api/goals/?username=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn list(&self, username: Option<&str>) -> Result<Vec<Goal>, ServiceError> {
        let username = self.api.username(username);
        self.api.get("/api/goals/", &[], &[("username", username)]).await
    }

    /// `GET /api/goals/{goal_id}?username=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn get(&self, goal_id: &str, username: Option<&str>) -> Result<Goal, ServiceError> {
        let username = self.api.username(username);
        self.api
            .get(GOALS_PATH, &[goal_id], &[("username", username)])
            .await
    }

    /// `POST /api/goals/`
    ///
    /// # Errors
    ///
    /// Returns a request-side [`ServiceError::Validation`] without calling the
    /// backend when the body is invalid.
    pub async fn create(&self, body: &CreateGoalBody) -> Result<Goal, ServiceError> {
        self.api.send(reqwest::Method::POST, "/api/goals/", &[], body).await
    }

    /// `PUT /api/goals/`
    ///
    /// # Errors
    ///
    /// Returns a request-side [`ServiceError::Validation`] without calling the
    /// backend when `goal_id` is missing or a set field is invalid.
    pub async fn update(&self, body: &UpdateGoalBody) -> Result<Goal, ServiceError> {
        self.api.send(reqwest::Method::PUT, "/api/goals/", &[], body).await
    }

    /// `GET /api/goals/{goal_id}/timeline?username=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn timeline(
        &self,
        goal_id: &str,
        username: Option<&str>,
    ) -> Result<GoalTimeline, ServiceError> {
        let username = self.api.username(username);
        self.api
            .get(GOALS_PATH, &[goal_id, "timeline"], &[("username", username)])
            .await
    }

    /// `GET /api/goals/{goal_id}/timeline/interpretation?username=&language=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn timeline_interpretation(
        &self,
        goal_id: &str,
        username: Option<&str>,
        language: Language,
    ) -> Result<TimelineInterpretation, ServiceError> {
        let username = self.api.username(username);
        self.api
            .get(
                GOALS_PATH,
                &[goal_id, "timeline", "interpretation"],
                &[("username", username), language_query(language)],
            )
            .await
    }

    /// `GET /api/goals/{goal_id}/recommendations?username=&language=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn recommendations(
        &self,
        goal_id: &str,
        username: Option<&str>,
        language: Language,
    ) -> Result<GoalRecommendations, ServiceError> {
        let username = self.api.username(username);
        self.api
            .get(
                GOALS_PATH,
                &[goal_id, "recommendations"],
                &[("username", username), language_query(language)],
            )
            .await
    }
}

const GOALS_PATH: &str = "/api/goals";
