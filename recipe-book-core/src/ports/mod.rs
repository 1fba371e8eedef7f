//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The store and the
//! services depend only on these traits, not on concrete implementations.

pub mod api;
pub mod storage;

use chrono::{DateTime, Utc};

pub use api::{Endpoint, GenericResponse, RecipeBookApi};
pub use storage::KeyValueStore;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Navigation requests issued by the state layer.
///
/// Routing itself lives outside the core; the session only needs to send the
/// user to the login view and remember where they were.
pub trait Navigator: Send + Sync {
    /// URL of the view currently shown, used as the default return URL
    fn current_url(&self) -> Option<String>;

    /// Show the login view; after logging in the user goes back to `return_url`
    fn to_login(&self, return_url: Option<&str>);
}
