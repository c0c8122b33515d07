//! Top-level orchestrator wiring the session store, token broker, and synchronizer.

// self
use crate::{
	_prelude::*,
	api::{BackendApi, MentorApplication, MentorApplicationRequest},
	auth::{BackendUserId, Email, ProfileEdits, TokenSecret, UserProfile},
	broker::TokenBroker,
	error::ConfigError,
	http::BackendHttpClient,
	obs::{self, OpKind, OpOutcome, OpSpan},
	provider::IdentityProvider,
	session::{Session, SessionChange, SessionStore, SessionSubscription},
	store::CredentialStore,
	sync::{ProfileSynchronizer, SaveReport},
};

/// Construction-time settings for a [`SessionBridge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
	/// Backend base URL.
	pub base_url: String,
	/// Deadline applied to exchange and profile requests.
	pub request_timeout: StdDuration,
	/// Deadline applied to the connectivity probe.
	pub connectivity_timeout: StdDuration,
}
impl BridgeConfig {
	/// Creates a config with the default deadlines.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			request_timeout: BackendApi::DEFAULT_REQUEST_TIMEOUT,
			connectivity_timeout: BackendApi::DEFAULT_CONNECTIVITY_TIMEOUT,
		}
	}

	/// Overrides the per-request deadline.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the connectivity-probe deadline.
	pub fn with_connectivity_timeout(mut self, timeout: StdDuration) -> Self {
		self.connectivity_timeout = timeout;

		self
	}
}

/// Owns the injected collaborators and exposes the bridge's public operations.
///
/// All collaborators are dependency-injected; the bridge holds no global state,
/// so independent bridges (tests, multiple backends) never interfere.
pub struct SessionBridge {
	config: BridgeConfig,
	provider: Arc<dyn IdentityProvider>,
	session: Arc<SessionStore>,
	broker: Arc<TokenBroker>,
	profiles: ProfileSynchronizer,
	guards: Mutex<Vec<SessionSubscription>>,
}
impl SessionBridge {
	/// Wires a bridge over the default reqwest transport.
	pub fn new(
		config: BridgeConfig,
		provider: Arc<dyn IdentityProvider>,
		store: Arc<dyn CredentialStore>,
	) -> Result<Self, ConfigError> {
		Self::with_http_client(config, provider, store, BackendHttpClient::default())
	}

	/// Wires a bridge that reuses a caller-provided transport.
	pub fn with_http_client(
		config: BridgeConfig,
		provider: Arc<dyn IdentityProvider>,
		store: Arc<dyn CredentialStore>,
		http: BackendHttpClient,
	) -> Result<Self, ConfigError> {
		let api = BackendApi::with_http_client(&config.base_url, http)?
			.with_request_timeout(config.request_timeout);
		let session = Arc::new(SessionStore::new(provider.clone()));
		let broker = Arc::new(TokenBroker::new(api.clone(), store));
		let profiles =
			ProfileSynchronizer::new(api, broker.clone(), session.clone(), provider.clone());

		Ok(Self { config, provider, session, broker, profiles, guards: Mutex::new(Vec::new()) })
	}

	/// Bridge configuration.
	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	/// Session store holding the current-session snapshot.
	pub fn session_store(&self) -> &Arc<SessionStore> {
		&self.session
	}

	/// Token broker backing authenticated calls.
	pub fn broker(&self) -> &Arc<TokenBroker> {
		&self.broker
	}

	/// Profile synchronizer.
	pub fn profiles(&self) -> &ProfileSynchronizer {
		&self.profiles
	}

	/// Subscribes to provider change pushes, seeds the session snapshot, and primes
	/// the backend token when a session already exists.
	///
	/// Provider-pushed sign-outs invalidate the credential cache without waiting for
	/// a bridge call; token priming after a pushed sign-in is deferred to the next
	/// operation that needs a token.
	pub async fn start(&self) -> Result<Option<Session>> {
		self.provider.subscribe_changes(self.session.clone());

		let broker = self.broker.clone();
		let guard = self.session.subscribe(move |change| {
			if matches!(change, SessionChange::SignedOut) {
				// A stale backend token must not outlive its session.
				if let Err(_e) = broker.invalidate() {
					#[cfg(feature = "tracing")]
					tracing::warn!(error = %_e, "credential-cache invalidation failed");
				}
			}
		});

		self.guards.lock().push(guard);

		let session = self.session.refresh().await?;

		if let Some(session) = &session {
			let _ = self.broker.obtain_token(&session.identity()).await;
		}

		Ok(session)
	}

	/// Signs in and opportunistically primes the backend token.
	///
	/// Token acquisition failure never fails the sign-in; the fallback chain
	/// recovers on the next profile save.
	pub async fn sign_in(&self, email: &Email, password: &str) -> Result<Session> {
		let session = self.session.sign_in(email, password).await?;
		let _ = self.broker.obtain_token(&session.identity()).await;

		Ok(session)
	}

	/// Registers a new account; no session exists until the email is verified.
	pub async fn sign_up(&self, email: &Email, password: &str, display_name: &str) -> Result<()> {
		self.session.sign_up(email, password, display_name).await
	}

	/// Ends the session and drops the cached backend credentials.
	pub async fn sign_out(&self) -> Result<()> {
		self.session.sign_out().await?;
		// The subscription already invalidated on the change; repeating is harmless
		// and covers bridges that were never started.
		self.broker.invalidate()
	}

	/// Requests a password-reset email.
	pub async fn send_password_reset(&self, email: &Email) -> Result<()> {
		self.session.send_password_reset(email).await
	}

	/// Last observed session, without blocking.
	pub fn current_session(&self) -> Option<Session> {
		self.session.current_session()
	}

	/// Cached backend user id, if one has been obtained for the current session.
	pub fn current_backend_user_id(&self) -> Result<Option<BackendUserId>> {
		self.broker.cached_user_id()
	}

	/// Returns a backend token for the current session, if one can be obtained.
	pub async fn backend_token(&self) -> Option<TokenSecret> {
		let session = self.session.current_session()?;

		self.broker.obtain_token(&session.identity()).await
	}

	/// Saves profile edits through the fallback chain.
	pub async fn save_profile(&self, edits: &ProfileEdits) -> Result<SaveReport> {
		self.profiles.save_profile(edits).await
	}

	/// Fetches the backend profile snapshot for prefill.
	pub async fn fetch_profile(&self) -> Result<Option<UserProfile>> {
		self.profiles.fetch_profile().await
	}

	/// Submits a mentor application.
	pub async fn become_mentor(
		&self,
		request: &MentorApplicationRequest,
	) -> Result<MentorApplication> {
		self.profiles.become_mentor(request).await
	}

	/// Probes backend reachability within the configured deadline.
	pub async fn check_connectivity(&self) -> Result<serde_json::Value> {
		const KIND: OpKind = OpKind::Connectivity;

		let span = OpSpan::new(KIND, "check_connectivity");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(self.broker.api().check_connectivity(self.config.connectivity_timeout))
			.await;

		obs::record_op_result(KIND, &result);

		result
	}
}
impl Debug for SessionBridge {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionBridge")
			.field("config", &self.config)
			.field("session", &self.session)
			.finish()
	}
}
