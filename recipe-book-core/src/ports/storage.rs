//! Local key-value storage port

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::result::Result;

/// Persisted authentication token
pub const STORAGE_KEY_AUTH_TOKEN: &str = "token";

/// Snapshot of the shopping list (JSON array)
pub const STORAGE_KEY_SHOPPING_LIST: &str = "shoppingList";

/// State of the in-repo mock backend (JSON object)
pub const STORAGE_KEY_BACKEND_MOCK: &str = "backendMock";

/// String key-value storage surviving application restarts
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and deserialize a JSON value
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(data) => Ok(Some(serde_json::from_str(&data)?)),
        None => Ok(None),
    }
}

/// Serialize and store a JSON value
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let data = serde_json::to_string(value)?;
    store.set(key, &data)
}
