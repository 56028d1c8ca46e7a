//! Dashboard endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FinanceApi, ServiceError, language_query};
use crate::domain::Language;
use crate::http::Transport;
use crate::validation::{Boundary, Validate, ValidationError, Validator};

/// Income and spending totals for the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    /// Income this month.
    pub total_income: f64,
    /// Spending this month.
    pub total_spending: f64,
    /// What could still be saved.
    pub savings_potential: f64,
    /// Spending last month.
    pub previous_month_spending: f64,
    /// Month-over-month spending change in percent.
    pub spending_change_percent: f64,
}

impl Validate for SpendingSummary {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .non_negative("total_income", self.total_income)
            .non_negative("total_spending", self.total_spending)
            .non_negative("previous_month_spending", self.previous_month_spending)
            .finish()
    }
}

/// Financial health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Score, 0 to 100.
    pub score: f64,
    /// Label such as `Good`.
    pub status: String,
    /// Display color.
    pub color: String,
}

impl Validate for HealthScore {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .check(
                (0.0..=100.0).contains(&self.score),
                "score",
                "score must be between 0 and 100",
            )
            .finish()
    }
}

/// `data` of `GET /api/dashboard/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    /// Monthly totals.
    pub summary: SpendingSummary,
    /// Spending per category this month.
    pub category_distribution: BTreeMap<String, f64>,
    /// Spending per category last month.
    pub previous_month_categories: BTreeMap<String, f64>,
    /// Short insights.
    pub insights: Vec<String>,
    /// Warnings.
    pub alerts: Vec<String>,
    /// Health score.
    pub health_score: HealthScore,
}

impl Validate for DashboardData {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .nested("summary", &self.summary)
            .nested("health_score", &self.health_score)
            .finish()
    }
}

/// `data` of `GET /api/dashboard/insights`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardInsights {
    /// Generated insights.
    #[serde(default)]
    pub insights: Vec<String>,
    /// Generated alerts.
    #[serde(default)]
    pub alerts: Vec<String>,
}

/// `data` of `GET /api/dashboard/goal-insights/{goal_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalInsights {
    /// Generated insights.
    #[serde(default)]
    pub insights: Vec<String>,
}

impl Validate for DashboardInsights {
    fn validate(&self, _boundary: Boundary) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for GoalInsights {
    fn validate(&self, _boundary: Boundary) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Dashboard endpoints, borrowed from a [`FinanceApi`].
#[derive(Debug)]
pub struct DashboardService<'a, T> {
    api: &'a FinanceApi<T>,
}

impl<'a, T> DashboardService<'a, T> {
    pub(super) const fn new(api: &'a FinanceApi<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> DashboardService<'_, T> {
    /// `GET /api/dashboard/?username=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn overview(&self, username: Option<&str>) -> Result<DashboardData, ServiceError> {
        let username = self.api.username(username);
        self.api
            .get("/api/dashboard/", &[], &[("username", username)])
            .await
    }

    /// `GET /api/dashboard/insights?username=&language=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn insights(
        &self,
        username: Option<&str>,
        language: Language,
    ) -> Result<DashboardInsights, ServiceError> {
        let username = self.api.username(username);
        self.api
            .get(
                "/api/dashboard/insights",
                &[],
                &[("username", username), language_query(language)],
            )
            .await
    }

    /// `GET /api/dashboard/goal-insights/{goal_id}?language=`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API or payload validation failure.
    pub async fn goal_insights(
        &self,
        goal_id: &str,
        language: Language,
    ) -> Result<GoalInsights, ServiceError> {
        self.api
            .get(
                "/api/dashboard/goal-insights",
                &[goal_id],
                &[language_query(language)],
            )
            .await
    }
}
