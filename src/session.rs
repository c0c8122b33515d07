//! Session snapshot state and change fan-out.

// self
use crate::{
	_prelude::*,
	auth::{Email, Identity},
	obs::{self, OpKind, OpOutcome, OpSpan},
	provider::{IdentityProvider, SessionChangeSink},
};

/// Name/avatar metadata attached to a provider session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserMetadata {
	/// Display name.
	pub name: Option<String>,
	/// Avatar URL.
	pub avatar_url: Option<String>,
}

/// Snapshot of an identity-provider session.
///
/// Owned exclusively by the [`SessionStore`]; everything else reads a clone and
/// never mutates the provider's state through it.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
	/// Provider-assigned subject identifier.
	pub user_id: String,
	/// Verified email address of the signed-in user.
	pub email: Email,
	/// Instant the provider issued the current credentials.
	pub issued_at: OffsetDateTime,
	/// Expiry instant, when the provider reports one.
	pub expires_at: Option<OffsetDateTime>,
	/// User metadata carried on the session.
	pub metadata: UserMetadata,
}
impl Session {
	/// Identity attributes used for backend sync and token exchange.
	pub fn identity(&self) -> Identity {
		let mut identity = Identity::new(self.email.clone());

		identity.name = self.metadata.name.clone();
		identity.avatar_url = self.metadata.avatar_url.clone();

		identity
	}
}

/// Session transitions reported by the identity provider.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionChange {
	/// A session was established.
	SignedIn(Session),
	/// The provider rotated the session credentials.
	TokenRefreshed(Session),
	/// The session ended.
	SignedOut,
}
impl SessionChange {
	/// Session carried by the change, absent for sign-out.
	pub fn session(&self) -> Option<&Session> {
		match self {
			SessionChange::SignedIn(session) | SessionChange::TokenRefreshed(session) =>
				Some(session),
			SessionChange::SignedOut => None,
		}
	}
}

type ChangeHandler = Arc<dyn Fn(&SessionChange) + Send + Sync>;
type HandlerRegistry = Arc<Mutex<BTreeMap<u64, ChangeHandler>>>;

/// Single source of truth for "who is signed in right now."
///
/// Changes are fanned out to subscribers synchronously with respect to the
/// provider's own notification, but consumers must treat delivery as
/// eventually-ordered: a provider that also pushes the change it triggered may
/// deliver the same transition twice, and handlers must tolerate that.
pub struct SessionStore {
	provider: Arc<dyn IdentityProvider>,
	current: RwLock<Option<Session>>,
	handlers: HandlerRegistry,
	next_handler: AtomicU64,
}
impl SessionStore {
	/// Creates a store over the injected provider adapter.
	pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
		Self {
			provider,
			current: RwLock::new(None),
			handlers: Default::default(),
			next_handler: AtomicU64::new(0),
		}
	}

	/// Returns the last observed session without blocking.
	pub fn current_session(&self) -> Option<Session> {
		self.current.read().clone()
	}

	/// Registers a change handler and returns its unregistration capability.
	///
	/// Dropping the [`SessionSubscription`] removes the handler, so a handler is
	/// never invoked after its owner is torn down.
	pub fn subscribe(
		&self,
		handler: impl Fn(&SessionChange) + Send + Sync + 'static,
	) -> SessionSubscription {
		let id = self.next_handler.fetch_add(1, Ordering::Relaxed);

		self.handlers.lock().insert(id, Arc::new(handler));

		SessionSubscription { id, handlers: Arc::downgrade(&self.handlers) }
	}

	/// Applies a provider-reported change and fans it out to every subscriber.
	pub fn apply_change(&self, change: &SessionChange) {
		*self.current.write() = change.session().cloned();

		// Handlers run outside the registry lock so one may drop its own
		// subscription without deadlocking.
		let handlers: Vec<ChangeHandler> = self.handlers.lock().values().cloned().collect();

		for handler in &handlers {
			handler(change);
		}
	}

	/// Seeds the snapshot from the provider's current session.
	pub async fn refresh(&self) -> Result<Option<Session>> {
		let session = self.provider.current_session().await?;

		*self.current.write() = session.clone();

		Ok(session)
	}

	/// Delegates sign-in to the provider, updates the snapshot, and notifies subscribers.
	pub async fn sign_in(&self, email: &Email, password: &str) -> Result<Session> {
		const KIND: OpKind = OpKind::SignIn;

		let span = OpSpan::new(KIND, "sign_in");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let session = self.provider.sign_in(email, password).await?;

				self.apply_change(&SessionChange::SignedIn(session.clone()));

				Ok(session)
			})
			.await;

		obs::record_op_result(KIND, &result);

		result
	}

	/// Delegates registration to the provider, requesting email verification.
	pub async fn sign_up(&self, email: &Email, password: &str, display_name: &str) -> Result<()> {
		const KIND: OpKind = OpKind::SignUp;

		let span = OpSpan::new(KIND, "sign_up");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result =
			span.instrument(async move { Ok(self.provider.sign_up(email, password, display_name).await?) }).await;

		obs::record_op_result(KIND, &result);

		result
	}

	/// Ends the session at the provider, clears the snapshot, and notifies subscribers.
	///
	/// Callers owning a token broker must also invalidate its credential cache; a
	/// stale backend token must not outlive the session that produced it.
	pub async fn sign_out(&self) -> Result<()> {
		const KIND: OpKind = OpKind::SignOut;

		let span = OpSpan::new(KIND, "sign_out");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.provider.sign_out().await?;

				self.apply_change(&SessionChange::SignedOut);

				Ok(())
			})
			.await;

		obs::record_op_result(KIND, &result);

		result
	}

	/// Requests a password-reset email for the address.
	pub async fn send_password_reset(&self, email: &Email) -> Result<()> {
		Ok(self.provider.send_password_reset(email).await?)
	}
}
impl SessionChangeSink for SessionStore {
	fn on_change(&self, change: SessionChange) {
		self.apply_change(&change);
	}
}
impl Debug for SessionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionStore")
			.field("session_established", &self.current.read().is_some())
			.field("subscribers", &self.handlers.lock().len())
			.finish()
	}
}

/// RAII unregistration capability returned by [`SessionStore::subscribe`].
pub struct SessionSubscription {
	id: u64,
	handlers: Weak<Mutex<BTreeMap<u64, ChangeHandler>>>,
}
impl Drop for SessionSubscription {
	fn drop(&mut self) {
		if let Some(handlers) = self.handlers.upgrade() {
			handlers.lock().remove(&self.id);
		}
	}
}
impl Debug for SessionSubscription {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionSubscription").field("id", &self.id).finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::provider::{ProviderError, ProviderFuture};

	struct NullProvider;
	impl IdentityProvider for NullProvider {
		fn current_session(&self) -> ProviderFuture<'_, Option<Session>> {
			Box::pin(async { Ok(None) })
		}

		fn sign_in<'a>(
			&'a self,
			_email: &'a Email,
			_password: &'a str,
		) -> ProviderFuture<'a, Session> {
			Box::pin(async {
				Err(ProviderError::Unavailable { reason: "null provider".into() })
			})
		}

		fn sign_up<'a>(
			&'a self,
			_email: &'a Email,
			_password: &'a str,
			_display_name: &'a str,
		) -> ProviderFuture<'a, ()> {
			Box::pin(async { Ok(()) })
		}

		fn sign_out(&self) -> ProviderFuture<'_, ()> {
			Box::pin(async { Ok(()) })
		}

		fn send_password_reset<'a>(&'a self, _email: &'a Email) -> ProviderFuture<'a, ()> {
			Box::pin(async { Ok(()) })
		}

		fn update_metadata<'a>(
			&'a self,
			_name: Option<&'a str>,
			_avatar_url: Option<&'a str>,
		) -> ProviderFuture<'a, ()> {
			Box::pin(async { Ok(()) })
		}

		fn subscribe_changes(&self, _sink: Arc<dyn SessionChangeSink>) {}
	}

	fn session_fixture() -> Session {
		Session {
			user_id: "uid-1".into(),
			email: Email::new("jane@example.org").expect("Email fixture should be valid."),
			issued_at: macros::datetime!(2025-01-01 00:00 UTC),
			expires_at: None,
			metadata: UserMetadata { name: Some("Jane".into()), avatar_url: None },
		}
	}

	#[test]
	fn apply_change_updates_snapshot_and_notifies() {
		let store = SessionStore::new(Arc::new(NullProvider));
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		let _subscription = store.subscribe(move |change| {
			sink.lock().push(change.clone());
		});

		assert!(store.current_session().is_none());

		let session = session_fixture();

		store.apply_change(&SessionChange::SignedIn(session.clone()));

		assert_eq!(store.current_session(), Some(session.clone()));

		store.apply_change(&SessionChange::SignedOut);

		assert!(store.current_session().is_none());

		let delivered = seen.lock();

		assert_eq!(delivered.len(), 2);
		assert_eq!(delivered[0], SessionChange::SignedIn(session));
		assert_eq!(delivered[1], SessionChange::SignedOut);
	}

	#[test]
	fn dropped_subscription_stops_delivery() {
		let store = SessionStore::new(Arc::new(NullProvider));
		let seen = Arc::new(Mutex::new(0_u32));
		let sink = seen.clone();
		let subscription = store.subscribe(move |_| {
			*sink.lock() += 1;
		});

		store.apply_change(&SessionChange::SignedIn(session_fixture()));
		drop(subscription);
		store.apply_change(&SessionChange::SignedOut);

		assert_eq!(*seen.lock(), 1);
	}

	#[test]
	fn handler_may_drop_its_own_subscription() {
		let store = Arc::new(SessionStore::new(Arc::new(NullProvider)));
		let slot: Arc<Mutex<Option<SessionSubscription>>> = Arc::new(Mutex::new(None));
		let slot_in_handler = slot.clone();
		let subscription = store.subscribe(move |_| {
			// One-shot handler: unregisters itself on first delivery.
			slot_in_handler.lock().take();
		});

		*slot.lock() = Some(subscription);

		store.apply_change(&SessionChange::SignedOut);
		store.apply_change(&SessionChange::SignedOut);

		assert!(slot.lock().is_none());
	}

	#[test]
	fn identity_carries_session_metadata() {
		let identity = session_fixture().identity();

		assert_eq!(identity.email.as_ref(), "jane@example.org");
		assert_eq!(identity.name.as_deref(), Some("Jane"));
		assert_eq!(identity.avatar_url, None);
	}

	#[tokio::test]
	async fn sign_in_failure_maps_provider_error() {
		let store = SessionStore::new(Arc::new(NullProvider));
		let email = Email::new("jane@example.org").expect("Email fixture should be valid.");
		let err = store
			.sign_in(&email, "hunter2")
			.await
			.expect_err("Null provider should reject sign-in.");

		assert!(matches!(err, Error::ProviderUnavailable { .. }));
		assert!(store.current_session().is_none());
	}
}
