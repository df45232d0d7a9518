//! Client for the myFlix movie API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the only module that performs HTTP; `session` (over `storage`)
//! holds the bearer token and profile snapshot it reads on every call.
//! `actions` and `favorites` are the screen-level flows built on those two,
//! and `notice` is what they report back to the user.

pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod favorites;
pub mod notice;
pub mod session;
pub mod storage;
pub mod types;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, StorageError};
pub use notice::Notice;
pub use session::{Session, SessionStore};
