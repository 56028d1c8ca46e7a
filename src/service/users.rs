//! User profile endpoints.

use serde::{Deserialize, Serialize};

use super::{FinanceApi, ServiceError};
use crate::domain::UserRole;
use crate::http::Transport;
use crate::validation::{Boundary, Validate, ValidationError, Validator};

/// Card summary embedded in a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCard {
    /// Card id.
    pub id: String,
    /// Display name.
    pub card_name: String,
    /// Masked number.
    pub card_number: String,
    /// Current balance.
    pub balance: f64,
    /// Card network, as sent by the backend.
    pub card_type: String,
}

/// A user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone_number: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Monthly salary.
    pub salary: f64,
    /// Salary currency.
    pub currency: String,
    /// Age in years.
    pub age: f64,
    /// Household size.
    pub family_size: f64,
    /// Free-form bio.
    #[serde(default)]
    pub bio: Option<String>,
    /// City or region.
    #[serde(default)]
    pub location: Option<String>,
    /// Account role.
    pub role: UserRole,
    /// Cards owned by the user.
    #[serde(default)]
    pub cards: Vec<UserCard>,
    /// Whether the account is enabled.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl User {
    /// `first_name last_name`, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Validate for User {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .require_non_empty("username", &self.username)
            .email("email", &self.email)
            .non_negative("salary", self.salary)
            .non_negative("age", self.age)
            .non_negative("family_size", self.family_size)
            .finish()
    }
}

/// Body of `PUT /api/users/{username}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserBody {
    /// New salary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    /// New age.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    /// New household size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_size: Option<f64>,
    /// New given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New bio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// New location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Validate for UpdateUserBody {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        Validator::new(boundary)
            .non_negative_opt("salary", self.salary)
            .non_negative_opt("age", self.age)
            .non_negative_opt("family_size", self.family_size)
            .finish()
    }
}

/// User endpoints, borrowed from a [`FinanceApi`].
#[derive(Debug)]
pub struct UsersService<'a, T> {
    api: &'a FinanceApi<T>,
}

impl<'a, T> UsersService<'a, T> {
    pub(super) const fn new(api: &'a FinanceApi<T>) -> Self {
        Self { api }
    }
}

impl<T: Transport> UsersService<'_, T> {
    /// `GET /api/users/{username}`
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] on API failure, or a response-side validation
    /// error when, for example, the email is malformed.
    pub async fn get(&self, username: Option<&str>) -> Result<User, ServiceError> {
        let username = self.api.username(username);
        self.api.get(USERS_PATH, &[username], &[]).await
    }

    /// `PUT /api/users/{username}`
    ///
    /// # Errors
    ///
    /// Returns a request-side [`ServiceError::Validation`] without calling the
    /// backend when a numeric field is negative.
    pub async fn update(
        &self,
        username: Option<&str>,
        body: &UpdateUserBody,
    ) -> Result<User, ServiceError> {
        let username = self.api.username(username);
        self.api
            .send(reqwest::Method::PUT, USERS_PATH, &[username], body)
            .await
    }
}

const USERS_PATH: &str = "/api/users";
