//! In-memory backend
//!
//! Serves the same endpoints as the real backend so the application can run
//! without a server. Users, recipes and ingredients live in memory and can be
//! persisted as JSON under the `backendMock` storage key.
//!
//! Endpoint behaviour:
//! - POST /auth/login answers 403 on unknown user or wrong password
//! - POST /auth/signup answers 409 when the username is taken
//! - GET /users/me answers 404 without an Authorization header, 401 on a bad
//!   or expired token
//! - GET|PUT /recipes and the ingredient endpoints answer 401 without a valid
//!   token
//! - POST /ingredients returns one ingredient per requested name, in request
//!   order, creating the missing ones

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Duration;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    AccessToken, AuthRequest, AuthResponse, Ingredient, IngredientNamesRequest, Recipe,
    RecipeIngredientPayload, RecipePayload, RecipeUnit, User,
};
use crate::ports::api::failure;
use crate::ports::storage::{load_json, save_json, STORAGE_KEY_BACKEND_MOCK};
use crate::ports::{Clock, Endpoint, GenericResponse, KeyValueStore, RecipeBookApi};

/// Default lifetime of issued tokens
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 3600;

const DEFAULT_USERNAME: &str = "testUser";
const DEFAULT_PASSWORD: &str = "testUser";

/// Raw response produced by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub body: Value,
}

impl MockResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, msg: &str) -> Self {
        Self {
            status,
            body: json!(GenericResponse::error(msg)),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DbUser {
    id: u64,
    username: String,
    password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MockData {
    users: Vec<DbUser>,
    #[serde(default)]
    recipes: Vec<Recipe>,
    #[serde(default)]
    ingredients: Vec<Ingredient>,
}

impl MockData {
    fn seeded() -> Self {
        let mut data = MockData {
            users: vec![DbUser {
                id: 1,
                username: DEFAULT_USERNAME.to_string(),
                password: DEFAULT_PASSWORD.to_string(),
            }],
            ..Default::default()
        };

        for payload in sample_recipes() {
            let ingredients = data.get_or_add_ingredients(&payload.ingredient_names());
            if let Ok(recipe) = payload.to_recipe(Uuid::new_v4().to_string(), &ingredients) {
                data.recipes.push(recipe);
            }
        }

        data
    }

    fn get_or_add_ingredients(&mut self, names: &[String]) -> Vec<Ingredient> {
        names
            .iter()
            .map(|name| {
                if let Some(existing) = self.ingredients.iter().find(|i| &i.name == name) {
                    return existing.clone();
                }
                let id = self.ingredients.iter().map(|i| i.id).max().unwrap_or(0) + 1;
                let ingredient = Ingredient::new(id, name.clone());
                self.ingredients.push(ingredient.clone());
                ingredient
            })
            .collect()
    }
}

/// In-memory implementation of the backend endpoints
pub struct MockBackend {
    data: Mutex<MockData>,
    storage: Option<Arc<dyn KeyValueStore>>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
    calls: Mutex<Vec<Endpoint>>,
}

impl MockBackend {
    /// Seeded backend that is not persisted
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            data: Mutex::new(MockData::seeded()),
            storage: None,
            clock,
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECONDS),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Backend persisted in `storage`. Previously stored data is loaded;
    /// missing or unreadable data falls back to the seeded defaults.
    pub fn with_storage(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let data = match load_json::<MockData>(storage.as_ref(), STORAGE_KEY_BACKEND_MOCK) {
            Ok(Some(data)) => {
                tracing::debug!(
                    "Restored mock backend: {} user(s), {} recipe(s)",
                    data.users.len(),
                    data.recipes.len()
                );
                data
            }
            Ok(None) => MockData::seeded(),
            Err(e) => {
                tracing::warn!("Ignoring stored mock backend data: {}", e);
                MockData::seeded()
            }
        };

        Self {
            data: Mutex::new(data),
            storage: Some(storage),
            clock,
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECONDS),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Lifetime of tokens issued from now on
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// How many times an endpoint has been called
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| **e == endpoint)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Issue a token for an existing user, as a successful login would
    pub fn issue_token(&self, username: &str) -> Option<String> {
        let data = self.lock();
        let user = data.users.iter().find(|u| u.username == username)?;
        self.token_for(user).ok()
    }

    /// Handle one request.
    ///
    /// `authorization` is the raw Authorization header value.
    pub fn handle(&self, endpoint: Endpoint, authorization: Option<&str>, body: Option<&Value>) -> MockResponse {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(endpoint);

        let response = match endpoint {
            Endpoint::Login => self.handle_login(body),
            Endpoint::Signup => self.handle_signup(body),
            Endpoint::CurrentUser => self.handle_current_user(authorization),
            Endpoint::GetRecipes => self.authorized(authorization, |data, _| MockResponse::ok(json!(data.recipes))),
            Endpoint::PutRecipes => match parse::<Vec<Recipe>>(body) {
                Some(recipes) => self.authorized_mut(authorization, |data| {
                    data.recipes = recipes;
                    MockResponse::ok(json!(GenericResponse::ok()))
                }),
                None => MockResponse::error(400, "invalid recipe list"),
            },
            Endpoint::GetIngredients => {
                self.authorized(authorization, |data, _| MockResponse::ok(json!(data.ingredients)))
            }
            Endpoint::AddIngredients => match parse::<IngredientNamesRequest>(body) {
                Some(request) => self.authorized_mut(authorization, |data| {
                    MockResponse::ok(json!(data.get_or_add_ingredients(&request.ingredient_names)))
                }),
                None => MockResponse::error(400, "invalid ingredient name list"),
            },
        };

        tracing::debug!(
            "Mock response for {} {}: [{}]",
            endpoint.method(),
            endpoint.path(),
            response.status
        );
        response
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn token_for(&self, user: &DbUser) -> Result<String> {
        let exp = (self.clock.now() + self.session_ttl).timestamp();
        AccessToken::new(user.id, user.username.clone(), Some(exp)).encode_unsigned()
    }

    fn persist(&self, data: &MockData) {
        if let Some(storage) = &self.storage {
            if let Err(e) = save_json(storage.as_ref(), STORAGE_KEY_BACKEND_MOCK, data) {
                tracing::warn!("Failed to store mock backend data: {}", e);
            }
        }
    }

    /// User owning a valid bearer token
    fn bearer_user(&self, data: &MockData, authorization: &str) -> Option<User> {
        let token = authorization.strip_prefix("Bearer ")?.trim();
        let claims = AccessToken::decode(token).ok()?;
        if claims.is_expired(self.clock.now()) {
            return None;
        }
        data.users
            .iter()
            .find(|u| u.id == claims.id && u.username == claims.username)
            .map(|u| User::new(u.id, u.username.clone()))
    }

    fn handle_login(&self, body: Option<&Value>) -> MockResponse {
        let Some(request) = parse::<AuthRequest>(body) else {
            return MockResponse::error(400, "invalid authentication request");
        };

        let data = self.lock();
        match data
            .users
            .iter()
            .find(|u| u.username == request.username && u.password == request.password)
        {
            Some(user) => self.token_response(user),
            None => MockResponse::error(403, "invalid 'username' or 'password'"),
        }
    }

    fn handle_signup(&self, body: Option<&Value>) -> MockResponse {
        let Some(request) = parse::<AuthRequest>(body) else {
            return MockResponse::error(400, "invalid authentication request");
        };
        if request.username.trim().is_empty() {
            return MockResponse::error(400, "'username' must not be empty");
        }

        let mut data = self.lock();
        if data.users.iter().any(|u| u.username == request.username) {
            return MockResponse::error(409, "'username' already exists");
        }

        let user = DbUser {
            id: data.users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            username: request.username,
            password: request.password,
        };
        data.users.push(user.clone());
        self.persist(&data);

        self.token_response(&user)
    }

    fn token_response(&self, user: &DbUser) -> MockResponse {
        match self.token_for(user) {
            Ok(token) => MockResponse::ok(json!(AuthResponse { token })),
            Err(e) => MockResponse::error(500, &e.to_string()),
        }
    }

    fn handle_current_user(&self, authorization: Option<&str>) -> MockResponse {
        let Some(authorization) = authorization else {
            return MockResponse::error(404, "NOT FOUND");
        };
        let data = self.lock();
        match self.bearer_user(&data, authorization) {
            Some(user) => MockResponse::ok(json!(user)),
            None => MockResponse::error(401, "UNAUTHORIZED"),
        }
    }

    fn authorized(&self, authorization: Option<&str>, f: impl FnOnce(&MockData, User) -> MockResponse) -> MockResponse {
        let data = self.lock();
        match authorization.and_then(|a| self.bearer_user(&data, a)) {
            Some(user) => f(&data, user),
            None => MockResponse::error(401, "UNAUTHORIZED"),
        }
    }

    fn authorized_mut(&self, authorization: Option<&str>, f: impl FnOnce(&mut MockData) -> MockResponse) -> MockResponse {
        let mut data = self.lock();
        if authorization.and_then(|a| self.bearer_user(&data, a)).is_none() {
            return MockResponse::error(401, "UNAUTHORIZED");
        }
        let response = f(&mut data);
        if response.is_success() {
            self.persist(&data);
        }
        response
    }

    fn call<T: DeserializeOwned>(&self, endpoint: Endpoint, token: Option<&str>, body: Option<Value>) -> Result<T> {
        let authorization = token.map(|t| format!("Bearer {}", t));
        let response = self.handle(endpoint, authorization.as_deref(), body.as_ref());

        if !response.is_success() {
            let backend_error = serde_json::from_value::<GenericResponse>(response.body)
                .ok()
                .and_then(|r| r.error);
            return Err(failure(endpoint, response.status, backend_error.as_deref()));
        }

        serde_json::from_value(response.body).map_err(Error::from)
    }
}

fn parse<T: DeserializeOwned>(body: Option<&Value>) -> Option<T> {
    body.and_then(|b| serde_json::from_value(b.clone()).ok())
}

#[async_trait]
impl RecipeBookApi for MockBackend {
    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse> {
        self.call(Endpoint::Login, None, Some(serde_json::to_value(request)?))
    }

    async fn signup(&self, request: &AuthRequest) -> Result<AuthResponse> {
        self.call(Endpoint::Signup, None, Some(serde_json::to_value(request)?))
    }

    async fn current_user(&self, token: &str) -> Result<User> {
        self.call(Endpoint::CurrentUser, Some(token), None)
    }

    async fn get_recipes(&self, token: Option<&str>) -> Result<Vec<Recipe>> {
        self.call(Endpoint::GetRecipes, token, None)
    }

    async fn replace_recipes(&self, token: Option<&str>, recipes: &[Recipe]) -> Result<()> {
        self.call::<GenericResponse>(Endpoint::PutRecipes, token, Some(serde_json::to_value(recipes)?))
            .map(|_| ())
    }

    async fn get_ingredients(&self, token: Option<&str>) -> Result<Vec<Ingredient>> {
        self.call(Endpoint::GetIngredients, token, None)
    }

    async fn get_or_add_ingredients(&self, token: Option<&str>, names: &[String]) -> Result<Vec<Ingredient>> {
        let request = IngredientNamesRequest {
            ingredient_names: names.to_vec(),
        };
        self.call(Endpoint::AddIngredients, token, Some(serde_json::to_value(request)?))
    }
}

fn item(name: &str, amount: Decimal, unit: RecipeUnit, phase: Option<&str>) -> RecipeIngredientPayload {
    RecipeIngredientPayload::new(name, amount, unit, phase)
}

fn pcs(name: &str, amount: i64) -> RecipeIngredientPayload {
    item(name, Decimal::new(amount, 0), RecipeUnit::Pcs, None)
}

fn sample_recipes() -> Vec<RecipePayload> {
    use RecipeUnit::*;

    let macaroni = Some("macaroni");
    let topping = Some("topping");
    let sauce = Some("sauce");
    let seasonings = Some("seasonings (optional)");

    vec![
        RecipePayload {
            name: "A Mighty Burger".to_string(),
            description: "Sample recipe of a burger".to_string(),
            image_url: "https://upload.wikimedia.org/wikipedia/commons/f/fb/Burger-King-Bacon-Cheeseburger.jpg"
                .to_string(),
            ingredient_items: vec![
                pcs("bun", 1),
                pcs("cheese slice", 1),
                pcs("beef steak", 1),
                pcs("pickles", 2),
                pcs("tomato slices", 2),
                pcs("green salad slice", 1),
            ],
        },
        RecipePayload {
            name: "Wiener Schnitzel".to_string(),
            description: "A traditional german schnitzel recipe".to_string(),
            image_url: "https://upload.wikimedia.org/wikipedia/commons/7/72/Schnitzel.JPG".to_string(),
            ingredient_items: vec![
                pcs("Premium wieners", 4),
                item("French fries", Decimal::new(5, 1), Kg, None),
            ],
        },
        RecipePayload {
            name: "Traditional Mac & Cheese".to_string(),
            description: "Sample recipe of mac and cheese".to_string(),
            image_url: "https://upload.wikimedia.org/wikipedia/commons/4/44/Original_Mac_n_Cheese_.jpg".to_string(),
            ingredient_items: vec![
                item("macaroni (elbow pasta)", Decimal::new(250, 0), Grams, macaroni),
                item("unsalted butter", Decimal::new(15, 0), Grams, macaroni),
                item("panko breadcrumbs", Decimal::ONE, Cup, topping),
                item("unsalted butter", Decimal::new(30, 0), Grams, topping),
                item("salt", Decimal::new(25, 2), TeaSpoon, topping),
                item("unsalted butter", Decimal::new(60, 0), Grams, sauce),
                item("flour", Decimal::new(33, 2), Cup, sauce),
                item("milk", Decimal::new(3, 0), Cup, sauce),
                item("freshly shredded cheese", Decimal::new(2, 0), Cup, sauce),
                item("freshly shredded mozzarella cheese", Decimal::ONE, Cup, sauce),
                item("salt", Decimal::new(75, 2), TeaSpoon, sauce),
                item("garlic powder", Decimal::ONE, TeaSpoon, seasonings),
                item("onion powder", Decimal::new(5, 1), TeaSpoon, seasonings),
                item("mustard powder", Decimal::new(5, 1), TeaSpoon, seasonings),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedClock, MemoryStorage};
    use chrono::Utc;

    fn backend() -> (MockBackend, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        (MockBackend::new(clock.clone()), clock)
    }

    async fn login(backend: &MockBackend) -> String {
        backend
            .login(&AuthRequest::new("testUser", "testUser"))
            .await
            .unwrap()
            .token
    }

    #[tokio::test]
    async fn test_login_with_default_user() {
        let (backend, clock) = backend();
        let token = login(&backend).await;

        let claims = AccessToken::decode(&token).unwrap();
        assert_eq!(claims.id, 1);
        assert_eq!(claims.username, "testUser");
        assert_eq!(
            claims.exp,
            Some((clock.now() + Duration::seconds(DEFAULT_SESSION_TTL_SECONDS)).timestamp())
        );
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let (backend, _) = backend();
        let err = backend
            .login(&AuthRequest::new("testUser", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "invalid username or password");
    }

    #[tokio::test]
    async fn test_signup_conflict_and_new_user() {
        let (backend, _) = backend();

        let err = backend
            .signup(&AuthRequest::new("testUser", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "username already exists");

        let token = backend
            .signup(&AuthRequest::new("chef", "secret"))
            .await
            .unwrap()
            .token;
        let user = backend.current_user(&token).await.unwrap();
        assert_eq!(user, User::new(2, "chef"));
    }

    #[test]
    fn test_raw_login_request() {
        let (backend, _) = backend();
        let body = json!({"username": "testUser", "password": "testUser"});
        let response = backend.handle(Endpoint::Login, None, Some(&body));
        assert_eq!(response.status, 200);
        assert!(response.body["token"].is_string());

        let response = backend.handle(Endpoint::Login, None, None);
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_current_user_without_header_is_not_found() {
        let (backend, _) = backend();
        let response = backend.handle(Endpoint::CurrentUser, None, None);
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let (backend, clock) = backend();
        let token = login(&backend).await;

        clock.advance(Duration::seconds(DEFAULT_SESSION_TTL_SECONDS + 1));

        let err = backend.current_user(&token).await.unwrap_err();
        assert!(err.is_unauthorized());
        let err = backend.get_recipes(Some(&token)).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_recipes_require_token() {
        let (backend, _) = backend();
        let err = backend.get_recipes(None).await.unwrap_err();
        assert!(err.is_unauthorized());
        let err = backend.replace_recipes(Some("garbage"), &[]).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_seeded_recipes() {
        let (backend, _) = backend();
        let token = login(&backend).await;
        let recipes = backend.get_recipes(Some(&token)).await.unwrap();

        assert_eq!(recipes.len(), 3);
        let mac = recipes.iter().find(|r| r.name == "Traditional Mac & Cheese").unwrap();
        assert_eq!(mac.phases.len(), 4);
        assert_eq!(mac.item_count(), 14);

        let ingredients = backend.get_ingredients(Some(&token)).await.unwrap();
        let butter: Vec<_> = ingredients.iter().filter(|i| i.name == "unsalted butter").collect();
        assert_eq!(butter.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_add_ingredients_keeps_request_order() {
        let (backend, _) = backend();
        let token = login(&backend).await;

        let names = vec!["salt".to_string(), "saffron".to_string(), "salt".to_string()];
        let ingredients = backend
            .get_or_add_ingredients(Some(&token), &names)
            .await
            .unwrap();

        assert_eq!(ingredients.len(), 3);
        assert_eq!(ingredients[0].name, "salt");
        assert_eq!(ingredients[1].name, "saffron");
        assert_eq!(ingredients[0], ingredients[2]);
        assert_eq!(backend.calls(Endpoint::AddIngredients), 1);
    }

    #[tokio::test]
    async fn test_state_persists_in_storage() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(Utc::now()));

        {
            let backend = MockBackend::with_storage(storage.clone(), clock.clone());
            backend
                .signup(&AuthRequest::new("chef", "secret"))
                .await
                .unwrap();
            let token = backend.issue_token("chef").unwrap();
            backend.replace_recipes(Some(&token), &[]).await.unwrap();
        }

        let backend = MockBackend::with_storage(storage, clock);
        let token = backend
            .login(&AuthRequest::new("chef", "secret"))
            .await
            .unwrap()
            .token;
        assert!(backend.get_recipes(Some(&token)).await.unwrap().is_empty());
    }
}
