//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{CachedCredentials, CredentialStore, StoreError},
};

/// Keeps the credential record in-process; the default backend for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<CachedCredentials>>);
impl CredentialStore for MemoryStore {
	fn load(&self) -> Result<CachedCredentials, StoreError> {
		Ok(self.0.read().clone())
	}

	fn save(&self, credentials: &CachedCredentials) -> Result<(), StoreError> {
		*self.0.write() = credentials.clone();

		Ok(())
	}

	fn clear(&self) -> Result<(), StoreError> {
		*self.0.write() = CachedCredentials::default();

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{BackendUserId, TokenSecret};

	#[test]
	fn save_load_clear_round_trip() {
		let store = MemoryStore::default();

		assert!(store.load().expect("Empty store should load.").is_empty());

		let credentials =
			CachedCredentials::new(TokenSecret::new("bearer-1"), BackendUserId::new(7));

		store.save(&credentials).expect("Save should succeed.");

		assert_eq!(store.load().expect("Warm store should load."), credentials);

		store.clear().expect("Clear should succeed.");

		assert!(store.load().expect("Cleared store should load.").is_empty());
	}
}
