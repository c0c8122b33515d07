//! Durable credential-cache contracts and built-in store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{BackendUserId, TokenSecret},
};

/// Cached backend credentials persisted across page reloads within a browsing session.
///
/// The token and user id are cached independently: an id can survive a lost token,
/// which is exactly the state that selects the id-scoped onboarding save path.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CachedCredentials {
	/// Bearer token, stored under the `backend_token` key.
	#[serde(rename = "backend_token", default, skip_serializing_if = "Option::is_none")]
	pub token: Option<TokenSecret>,
	/// Stringified numeric user id, stored under the `backend_user_id` key.
	#[serde(rename = "backend_user_id", default, skip_serializing_if = "Option::is_none")]
	pub user_id: Option<BackendUserId>,
}
impl CachedCredentials {
	/// Credentials freshly minted by a token exchange.
	pub fn new(token: TokenSecret, user_id: BackendUserId) -> Self {
		Self { token: Some(token), user_id: Some(user_id) }
	}

	/// Returns `true` when neither credential is cached.
	pub fn is_empty(&self) -> bool {
		self.token.is_none() && self.user_id.is_none()
	}
}

/// Storage contract for the credential cache.
///
/// Reads and writes are synchronous from the caller's perspective, matching the
/// key-value storage the bridge fronts. A single writer (one tab) is assumed;
/// cross-tab coherence is the backend implementation's problem, not this trait's.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Loads the cached credentials; an empty record when nothing is stored.
	fn load(&self) -> Result<CachedCredentials, StoreError>;

	/// Persists or replaces the cached credentials.
	fn save(&self, credentials: &CachedCredentials) -> Result<(), StoreError>;

	/// Removes both cached credentials.
	fn clear(&self) -> Result<(), StoreError>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
