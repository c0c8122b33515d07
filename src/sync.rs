//! Profile synchronization between the identity provider and the backend.

// self
use crate::{
	_prelude::*,
	api::{BackendApi, MentorApplication, MentorApplicationRequest, ProfileUpdateRequest,
		SyncUserRequest},
	auth::{Identity, ProfileEdits, UserProfile},
	broker::TokenBroker,
	obs::{self, OpKind, OpOutcome, OpSpan},
	provider::IdentityProvider,
	session::SessionStore,
};

/// Named profile-save strategy families, attempted in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveStrategy {
	/// Cached bearer token, `PUT /users/me`.
	AuthenticatedUpdate,
	/// Cached user id without a usable token, `PUT /users/{id}/profile`.
	IdScopedUpdate,
	/// No usable cache: `POST /users/sync`, token exchange, one authenticated retry.
	SyncAndRetry,
}
impl SaveStrategy {
	/// Returns a stable label suitable for display or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SaveStrategy::AuthenticatedUpdate => "authenticated_update",
			SaveStrategy::IdScopedUpdate => "id_scoped_update",
			SaveStrategy::SyncAndRetry => "sync_and_retry",
		}
	}
}
impl Display for SaveStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome of a successful profile save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveReport {
	/// Strategy that performed the backend write.
	pub strategy: SaveStrategy,
	/// Whether provider name/avatar metadata was reconciled as part of the save.
	pub metadata_reconciled: bool,
}

/// Writes profile edits through whichever save path the cached credential state
/// permits, then reconciles provider metadata.
///
/// The backend is authoritative for bio/region; provider metadata is
/// authoritative for the name/avatar shown on session objects. Overlapping saves
/// are last-write-wins; no cross-save locking is attempted.
pub struct ProfileSynchronizer {
	api: BackendApi,
	broker: Arc<TokenBroker>,
	session: Arc<SessionStore>,
	provider: Arc<dyn IdentityProvider>,
}
impl ProfileSynchronizer {
	/// Creates a synchronizer over the injected collaborators.
	pub fn new(
		api: BackendApi,
		broker: Arc<TokenBroker>,
		session: Arc<SessionStore>,
		provider: Arc<dyn IdentityProvider>,
	) -> Self {
		Self { api, broker, session, provider }
	}

	/// Persists profile edits, falling through the strategy chain as needed.
	///
	/// Every failure surfaces as [`Error::ProfileSaveFailed`] with a reason naming
	/// the step that failed; nothing else escapes this boundary.
	pub async fn save_profile(&self, edits: &ProfileEdits) -> Result<SaveReport> {
		const KIND: OpKind = OpKind::ProfileSave;

		let span = OpSpan::new(KIND, "save_profile");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.save_profile_inner(edits)).await;

		obs::record_op_result(KIND, &result);

		result
	}

	async fn save_profile_inner(&self, edits: &ProfileEdits) -> Result<SaveReport> {
		let session = self
			.session
			.current_session()
			.ok_or_else(|| terminal_failure("session lookup", "no active session"))?;
		let identity = session.identity();
		let request = ProfileUpdateRequest::from(edits);
		let strategy = self.run_strategies(&identity, &request).await?;
		let metadata_reconciled = if edits.touches_identity_metadata() {
			self.provider
				.update_metadata(edits.name.as_deref(), edits.avatar_url.as_deref())
				.await
				.map_err(|e| terminal_failure("provider metadata update", &e.to_string()))?;

			true
		} else {
			false
		};

		Ok(SaveReport { strategy, metadata_reconciled })
	}

	async fn run_strategies(
		&self,
		identity: &Identity,
		request: &ProfileUpdateRequest,
	) -> Result<SaveStrategy> {
		// Storage read failures degrade to an empty cache, which lands on the
		// sync-and-retry family instead of escaping the boundary.
		let cached = self.broker.cached_credentials().unwrap_or_default();

		if let Some(token) = cached.token {
			match self.api.update_profile(&token, request).await {
				Ok(()) => return Ok(SaveStrategy::AuthenticatedUpdate),
				Err(e) if e.is_token_rejection() => {
					// The token is stale; the id may still be good.
					let _ = self.broker.discard_token();
				},
				Err(e) => return Err(step_failure("authenticated update", &e)),
			}
		}
		if let Some(user_id) = self.broker.cached_user_id().unwrap_or_default() {
			match self.api.update_profile_by_id(user_id, request).await {
				Ok(()) => {
					// Restore the authenticated path for subsequent saves.
					let _ = self.broker.obtain_token(identity).await;

					return Ok(SaveStrategy::IdScopedUpdate);
				},
				Err(e) if e.is_token_rejection() => (),
				Err(e) => return Err(step_failure("id-scoped update", &e)),
			}
		}

		self.api
			.sync_user(&SyncUserRequest::from_identity(identity))
			.await
			.map_err(|e| step_failure("user sync", &e))?;

		let token = self
			.broker
			.try_obtain_token(identity)
			.await
			.map_err(|e| step_failure("token exchange", &e))?;

		self.api
			.update_profile(&token, request)
			.await
			.map_err(|e| step_failure("authenticated retry", &e))?;

		Ok(SaveStrategy::SyncAndRetry)
	}

	/// Fetches the backend profile snapshot for prefilling edit forms.
	///
	/// Returns `Ok(None)` when no backend user id has been cached yet.
	pub async fn fetch_profile(&self) -> Result<Option<UserProfile>> {
		let Some(user_id) = self.broker.cached_user_id()? else {
			return Ok(None);
		};

		Ok(Some(self.api.fetch_user(user_id).await?.into_profile()))
	}

	/// Submits a mentor application under the current session's backend token.
	pub async fn become_mentor(
		&self,
		request: &MentorApplicationRequest,
	) -> Result<MentorApplication> {
		const KIND: OpKind = OpKind::MentorApplication;

		let span = OpSpan::new(KIND, "become_mentor");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async {
				let session =
					self.session.current_session().ok_or(Error::MissingBackendToken)?;
				let token = self.broker.try_obtain_token(&session.identity()).await?;

				self.api.become_mentor(&token, request).await
			})
			.await;

		obs::record_op_result(KIND, &result);

		result
	}
}
impl Debug for ProfileSynchronizer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProfileSynchronizer").field("api", &self.api).finish()
	}
}

fn step_failure(step: &str, err: &Error) -> Error {
	terminal_failure(step, &err.to_string())
}

fn terminal_failure(step: &str, reason: &str) -> Error {
	Error::ProfileSaveFailed { reason: format!("{step}: {reason}") }
}
