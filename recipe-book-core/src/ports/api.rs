//! Backend API port
//!
//! The backend is an opaque request/response collaborator. Every call maps
//! to one REST endpoint; failures come back as `Error::Api` carrying the HTTP
//! status and a user-facing message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::{AuthRequest, AuthResponse, Ingredient, Recipe, User};

/// Backend endpoints consumed by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Signup,
    CurrentUser,
    GetRecipes,
    PutRecipes,
    GetIngredients,
    AddIngredients,
}

impl Endpoint {
    pub fn method(&self) -> &'static str {
        match self {
            Endpoint::Login | Endpoint::Signup | Endpoint::AddIngredients => "POST",
            Endpoint::CurrentUser | Endpoint::GetRecipes | Endpoint::GetIngredients => "GET",
            Endpoint::PutRecipes => "PUT",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Login => "/auth/login",
            Endpoint::Signup => "/auth/signup",
            Endpoint::CurrentUser => "/users/me",
            Endpoint::GetRecipes | Endpoint::PutRecipes => "/recipes",
            Endpoint::GetIngredients | Endpoint::AddIngredients => "/ingredients",
        }
    }

    /// Route lookup by method and path
    pub fn route(method: &str, path: &str) -> Option<Endpoint> {
        let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');
        [
            Endpoint::Login,
            Endpoint::Signup,
            Endpoint::CurrentUser,
            Endpoint::GetRecipes,
            Endpoint::PutRecipes,
            Endpoint::GetIngredients,
            Endpoint::AddIngredients,
        ]
        .into_iter()
        .find(|e| e.method().eq_ignore_ascii_case(method) && e.path() == path)
    }

    /// Operation name used in error messages
    pub fn operation(&self) -> &'static str {
        match self {
            Endpoint::Login => "logging in",
            Endpoint::Signup => "signing up",
            Endpoint::CurrentUser => "loading current user",
            Endpoint::GetRecipes => "loading recipes",
            Endpoint::PutRecipes => "storing recipes",
            Endpoint::GetIngredients => "loading ingredients",
            Endpoint::AddIngredients => "adding ingredients",
        }
    }
}

/// Generic status body returned by many endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenericResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenericResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "ERROR".to_string(),
            error: Some(msg.into()),
        }
    }
}

/// Build the error for a failed backend response.
///
/// Statuses with a known meaning for the endpoint get a fixed user-facing
/// message; otherwise the backend's own error text is used when present.
pub fn failure(endpoint: Endpoint, status: u16, backend_error: Option<&str>) -> Error {
    let message = match (endpoint, status) {
        (Endpoint::Login, 403) => "invalid username or password".to_string(),
        (Endpoint::Signup, 409) => "username already exists".to_string(),
        (Endpoint::CurrentUser, 404) => "user not exist".to_string(),
        _ => match backend_error {
            Some(msg) if !msg.trim().is_empty() => msg.to_string(),
            _ => format!("HTTP {} on {}", status, endpoint.operation()),
        },
    };
    Error::api(status, message)
}

/// Backend API abstraction
///
/// Calls that need an authenticated user take the bearer token explicitly;
/// the caller reads it from the auth state.
#[async_trait]
pub trait RecipeBookApi: Send + Sync {
    /// Log in with existing credentials
    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse>;

    /// Create a new user and log in as that user
    async fn signup(&self, request: &AuthRequest) -> Result<AuthResponse>;

    /// User owning the token
    async fn current_user(&self, token: &str) -> Result<User>;

    async fn get_recipes(&self, token: Option<&str>) -> Result<Vec<Recipe>>;

    /// Replace the whole recipe collection
    async fn replace_recipes(&self, token: Option<&str>, recipes: &[Recipe]) -> Result<()>;

    async fn get_ingredients(&self, token: Option<&str>) -> Result<Vec<Ingredient>>;

    /// Get or create (when missing) one ingredient per name
    async fn get_or_add_ingredients(&self, token: Option<&str>, names: &[String]) -> Result<Vec<Ingredient>>;
}
