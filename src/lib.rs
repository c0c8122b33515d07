//! Client-side session bridge: reconcile the identity provider's session, the backend's
//! bearer token, and durable credential storage behind one fallback-aware API.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

#[cfg(feature = "reqwest")] pub mod api;
pub mod auth;
#[cfg(feature = "reqwest")] pub mod bridge;
#[cfg(feature = "reqwest")] pub mod broker;
pub mod error;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod provider;
pub mod session;
pub mod store;
#[cfg(feature = "reqwest")] pub mod sync;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		bridge::{BridgeConfig, SessionBridge},
		provider::IdentityProvider,
		store::{CredentialStore, MemoryStore},
	};

	/// Constructs a [`SessionBridge`] backed by an in-memory credential store and the
	/// default reqwest transport used across integration tests.
	pub fn build_test_bridge(
		base_url: &str,
		provider: Arc<dyn IdentityProvider>,
	) -> (SessionBridge, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let bridge = SessionBridge::new(BridgeConfig::new(base_url), provider, store)
			.expect("Failed to build test bridge.");

		(bridge, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{
			Arc, Weak,
			atomic::{AtomicU64, Ordering},
		},
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
