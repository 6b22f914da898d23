//! API keys for the editor extension
//!
//! Keys authenticate the `/api/v1` endpoints through the `ApiKeyUser`
//! extractor. Users manage them with their session token.

pub mod db;
pub mod handlers;

pub use handlers::{create_api_key, list_api_keys, revoke_api_key, MAX_ACTIVE_KEYS};
