//! Backend token acquisition, caching, and single-flight exchange.

// self
use crate::{
	_prelude::*,
	api::BackendApi,
	auth::{BackendUserId, Identity, TokenSecret},
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::{CachedCredentials, CredentialStore},
};

/// Acquires and caches backend bearer tokens for the active session.
///
/// The cache is consulted before any network traffic, concurrent callers share a
/// single in-flight exchange, and a sign-out that lands while an exchange is in
/// flight wins: the late result is discarded rather than resurrecting credentials
/// for a session that no longer exists.
pub struct TokenBroker {
	api: BackendApi,
	store: Arc<dyn CredentialStore>,
	exchange: AsyncMutex<()>,
	epoch: AtomicU64,
}
impl TokenBroker {
	/// Creates a broker over the backend client and credential store.
	pub fn new(api: BackendApi, store: Arc<dyn CredentialStore>) -> Self {
		Self { api, store, exchange: AsyncMutex::new(()), epoch: AtomicU64::new(0) }
	}

	/// Backend client used for exchanges.
	pub fn api(&self) -> &BackendApi {
		&self.api
	}

	/// Loads the full cached credential record.
	pub fn cached_credentials(&self) -> Result<CachedCredentials> {
		Ok(self.store.load()?)
	}

	/// Cached bearer token, if one is stored.
	pub fn cached_token(&self) -> Result<Option<TokenSecret>> {
		Ok(self.cached_credentials()?.token)
	}

	/// Cached backend user id, if one is stored.
	///
	/// The id can outlive the token; that partial state is what selects the
	/// id-scoped profile-save path.
	pub fn cached_user_id(&self) -> Result<Option<BackendUserId>> {
		Ok(self.cached_credentials()?.user_id)
	}

	/// Returns a backend token, exchanging identity attributes when none is cached.
	///
	/// Concurrent calls are collapsed onto one exchange: the first caller performs
	/// the network round trip while the rest wait and then read the persisted
	/// result. If the cache was invalidated while the exchange was in flight, the
	/// stale result is dropped and [`Error::MissingBackendToken`] is returned.
	pub async fn try_obtain_token(&self, identity: &Identity) -> Result<TokenSecret> {
		if let Some(token) = self.cached_token()? {
			return Ok(token);
		}

		let _flight = self.exchange.lock().await;

		// Another caller may have completed the exchange while we waited.
		if let Some(token) = self.cached_token()? {
			return Ok(token);
		}

		const KIND: OpKind = OpKind::TokenExchange;

		let span = OpSpan::new(KIND, "try_obtain_token");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let epoch = self.epoch.load(Ordering::SeqCst);
		let result = span
			.instrument(async {
				let exchanged = self.api.exchange_token(identity).await?;

				// A sign-out raced the exchange; its result must not be persisted.
				if self.epoch.load(Ordering::SeqCst) != epoch {
					return Err(Error::MissingBackendToken);
				}

				self.store
					.save(&CachedCredentials::new(exchanged.token.clone(), exchanged.user_id))?;

				Ok(exchanged.token)
			})
			.await;

		obs::record_op_result(KIND, &result);

		result
	}

	/// Best-effort variant of [`Self::try_obtain_token`].
	///
	/// Token acquisition is an opportunistic optimization on most paths; callers
	/// that can proceed without a token use this and fall back to unauthenticated
	/// behavior on `None`.
	pub async fn obtain_token(&self, identity: &Identity) -> Option<TokenSecret> {
		match self.try_obtain_token(identity).await {
			Ok(token) => Some(token),
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %_e, "backend token exchange failed");

				None
			},
		}
	}

	/// Drops only the cached token, keeping the user id.
	///
	/// Used when the backend rejects a token: the surviving id still selects the
	/// id-scoped profile-save path.
	pub fn discard_token(&self) -> Result<()> {
		let mut credentials = self.store.load()?;

		credentials.token = None;

		Ok(self.store.save(&credentials)?)
	}

	/// Drops the cached credentials and poisons any in-flight exchange.
	///
	/// Called on sign-out and whenever the backend rejects a cached token.
	pub fn invalidate(&self) -> Result<()> {
		self.epoch.fetch_add(1, Ordering::SeqCst);

		Ok(self.store.clear()?)
	}
}
impl Debug for TokenBroker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBroker")
			.field("api", &self.api)
			.field("epoch", &self.epoch.load(Ordering::SeqCst))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::Email, store::MemoryStore};

	fn identity_fixture() -> Identity {
		Identity::new(Email::new("jane@example.org").expect("Email fixture should be valid."))
	}

	fn unreachable_broker(store: Arc<MemoryStore>) -> TokenBroker {
		// Nothing here should ever hit the network; the port is a canary.
		let api = BackendApi::new("http://127.0.0.1:9").expect("Base URL fixture should parse.");

		TokenBroker::new(api, store)
	}

	#[tokio::test]
	async fn warm_cache_short_circuits_the_exchange() {
		let store = Arc::new(MemoryStore::default());

		store
			.save(&CachedCredentials::new(TokenSecret::new("bearer-1"), BackendUserId::new(7)))
			.expect("Memory store should accept a save.");

		let broker = unreachable_broker(store);
		let token = broker
			.try_obtain_token(&identity_fixture())
			.await
			.expect("Cached token should be returned without a network call.");

		assert_eq!(token.expose(), "bearer-1");
	}

	#[tokio::test]
	async fn invalidate_clears_the_cache() {
		let store = Arc::new(MemoryStore::default());

		store
			.save(&CachedCredentials::new(TokenSecret::new("bearer-1"), BackendUserId::new(7)))
			.expect("Memory store should accept a save.");

		let broker = unreachable_broker(store.clone());

		broker.invalidate().expect("Invalidation should clear the memory store.");

		assert!(store.load().expect("Memory store should load.").is_empty());
		assert!(broker.cached_token().expect("Cache read should succeed.").is_none());
	}

	#[tokio::test]
	async fn cached_user_id_survives_a_missing_token() {
		let store = Arc::new(MemoryStore::default());

		store
			.save(&CachedCredentials { token: None, user_id: Some(BackendUserId::new(3)) })
			.expect("Memory store should accept a save.");

		let broker = unreachable_broker(store);

		assert_eq!(
			broker.cached_user_id().expect("Cache read should succeed."),
			Some(BackendUserId::new(3))
		);
		assert!(broker.cached_token().expect("Cache read should succeed.").is_none());
	}
}
