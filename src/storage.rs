//!
//! clinica token store
//! -------------------
//! Durable key-value persistence for the session token and the few user scalars
//! cached next to it. The store is deliberately dumb: string keys, string values,
//! last write wins. Consumers receive it as a [`SharedTokenStore`] handle; there is
//! no process-wide instance.
//!
//! Two implementations exist:
//! - [`KvStore`]: an in-memory map persisted as JSON under the state directory.
//! - [`MemoryStore`]: process-local only, for ephemeral runs and tests.

use std::sync::Arc;

use crate::error::AppResult;

pub mod kv;
pub mod memory;

pub use kv::KvStore;
pub use memory::MemoryStore;

/// Bearer token issued at login; its presence is the only "logged in" signal.
pub const TOKEN_KEY: &str = "userToken";
/// Role claim cached by the request interceptor.
pub const ROLE_KEY: &str = "userRole";
pub const NAME_KEY: &str = "userName";
pub const ID_KEY: &str = "userId";

/// Every key the session lifecycle writes; logout clears all of them.
pub const SESSION_KEYS: [&str; 4] = [TOKEN_KEY, ROLE_KEY, NAME_KEY, ID_KEY];

pub trait TokenStore: Send + Sync {
    /// Overwrite `key`. Fails only when the storage medium does.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    /// `Ok(None)` for a missing key.
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    /// Removing a missing key is a no-op.
    fn remove(&self, key: &str) -> AppResult<()>;
}

pub type SharedTokenStore = Arc<dyn TokenStore>;
