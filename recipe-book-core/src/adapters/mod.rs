//! Adapter implementations (hexagonal architecture)
//!
//! Adapters implement the port interfaces for concrete technologies.

pub mod http;
#[cfg(test)]
mod http_mock;
pub mod local;
pub mod mock_backend;
pub mod storage;

pub use http::HttpApi;
pub use local::{FixedClock, RecordingNavigator, SystemClock};
pub use mock_backend::{MockBackend, MockResponse};
pub use storage::{FileStorage, MemoryStorage};
