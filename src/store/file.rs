//! Simple file-backed [`CredentialStore`] for desktop shells and lightweight deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{CachedCredentials, CredentialStore, StoreError},
};

/// Persists the credential record to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<CachedCredentials>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot =
			if path.exists() { Self::load_snapshot(&path)? } else { CachedCredentials::default() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<CachedCredentials, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(CachedCredentials::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &CachedCredentials) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn load(&self) -> Result<CachedCredentials, StoreError> {
		Ok(self.inner.read().clone())
	}

	fn save(&self, credentials: &CachedCredentials) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		*guard = credentials.clone();

		self.persist_locked(&guard)
	}

	fn clear(&self) -> Result<(), StoreError> {
		let mut guard = self.inner.write();

		*guard = CachedCredentials::default();

		self.persist_locked(&guard)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;
	use crate::auth::{BackendUserId, TokenSecret};

	fn temp_path() -> PathBuf {
		let unique = format!(
			"session_bridge_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let credentials =
			CachedCredentials::new(TokenSecret::new("bearer-file"), BackendUserId::new(11));

		store.save(&credentials).expect("Failed to save credentials to file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = reopened.load().expect("Failed to load credentials after reopen.");

		assert_eq!(fetched, credentials);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn clear_empties_persisted_snapshot() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let credentials =
			CachedCredentials::new(TokenSecret::new("bearer-clear"), BackendUserId::new(5));

		store.save(&credentials).expect("Failed to save credentials to file store.");
		store.clear().expect("Failed to clear file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen cleared file store.");

		assert!(reopened.load().expect("Failed to load cleared store.").is_empty());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn empty_file_loads_as_empty_record() {
		let path = temp_path();

		File::create(&path).expect("Failed to create empty snapshot file.");

		let store = FileStore::open(&path).expect("Empty snapshot file should open.");

		assert!(store.load().expect("Empty snapshot should load.").is_empty());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
