//! Backend HTTP client
//!
//! Talks JSON to the recipe book backend. Authenticated calls send
//! `Authorization: Bearer <token>`; non-2xx answers are mapped to
//! `Error::Api` through the same status table the mock backend uses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::result::{Error, Result};
use crate::domain::{AuthRequest, AuthResponse, Ingredient, IngredientNamesRequest, Recipe, User};
use crate::ports::api::failure;
use crate::ports::{Endpoint, GenericResponse, RecipeBookApi};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Backend API client
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::Config("backend server base URL cannot be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn send<T: DeserializeOwned>(&self, endpoint: Endpoint, token: Option<&str>, body: Option<Value>) -> Result<T> {
        let method = Method::from_bytes(endpoint.method().as_bytes())
            .map_err(|e| Error::Config(format!("invalid method for {}: {}", endpoint.path(), e)))?;

        let mut request = self.client.request(method, self.url(endpoint));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        tracing::debug!("{} {}", endpoint.method(), endpoint.path());
        let response = request.send().await.map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response while {}: {}", endpoint.operation(), e)))?;

        if !status.is_success() {
            let backend_error = serde_json::from_str::<GenericResponse>(&text)
                .ok()
                .and_then(|r| r.error);
            return Err(failure(endpoint, status.as_u16(), backend_error.as_deref()));
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| Error::transport(format!("Invalid response while {}: {}", endpoint.operation(), e)))
    }

    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::transport(format!("Connection timed out after {} seconds", REQUEST_TIMEOUT_SECS))
        } else if error.is_connect() {
            Error::transport(format!("Unable to connect to backend server at {}", self.base_url))
        } else {
            Error::transport(format!("Backend request failed: {}", error))
        }
    }
}

#[async_trait]
impl RecipeBookApi for HttpApi {
    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse> {
        self.send(Endpoint::Login, None, Some(serde_json::to_value(request)?))
            .await
    }

    async fn signup(&self, request: &AuthRequest) -> Result<AuthResponse> {
        self.send(Endpoint::Signup, None, Some(serde_json::to_value(request)?))
            .await
    }

    async fn current_user(&self, token: &str) -> Result<User> {
        self.send(Endpoint::CurrentUser, Some(token), None).await
    }

    async fn get_recipes(&self, token: Option<&str>) -> Result<Vec<Recipe>> {
        self.send(Endpoint::GetRecipes, token, None).await
    }

    async fn replace_recipes(&self, token: Option<&str>, recipes: &[Recipe]) -> Result<()> {
        self.send::<Value>(Endpoint::PutRecipes, token, Some(serde_json::to_value(recipes)?))
            .await
            .map(|_| ())
    }

    async fn get_ingredients(&self, token: Option<&str>) -> Result<Vec<Ingredient>> {
        self.send(Endpoint::GetIngredients, token, None).await
    }

    async fn get_or_add_ingredients(&self, token: Option<&str>, names: &[String]) -> Result<Vec<Ingredient>> {
        let request = IngredientNamesRequest {
            ingredient_names: names.to_vec(),
        };
        self.send(Endpoint::AddIngredients, token, Some(serde_json::to_value(request)?))
            .await
    }
}
