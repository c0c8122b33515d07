#![allow(dead_code)]

// std
use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};
// crates.io
use parking_lot::Mutex;
use time::OffsetDateTime;
// self
use session_bridge::{
	auth::Email,
	bridge::{BridgeConfig, SessionBridge},
	provider::{IdentityProvider, ProviderError, ProviderFuture, SessionChangeSink},
	session::{Session, SessionChange, UserMetadata},
	store::{CredentialStore, MemoryStore},
};

/// Scripted identity provider that records every call and can push changes.
#[derive(Default)]
pub struct ScriptedProvider {
	session: Mutex<Option<Session>>,
	sink: Mutex<Option<Arc<dyn SessionChangeSink>>>,
	calls: Mutex<Vec<String>>,
	fail_metadata: AtomicBool,
}
impl ScriptedProvider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_session(session: Session) -> Self {
		let provider = Self::default();

		*provider.session.lock() = Some(session);

		provider
	}

	/// Makes subsequent metadata updates fail, as an unreachable provider would.
	pub fn fail_metadata_updates(&self) {
		self.fail_metadata.store(true, Ordering::SeqCst);
	}

	/// Pushes a change through the registered sink, as the hosted provider does.
	pub fn emit(&self, change: SessionChange) {
		let sink = self.sink.lock().clone();

		if let Some(sink) = sink {
			sink.on_change(change);
		}
	}

	pub fn recorded_calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	fn record(&self, call: impl Into<String>) {
		self.calls.lock().push(call.into());
	}
}
impl IdentityProvider for ScriptedProvider {
	fn current_session(&self) -> ProviderFuture<'_, Option<Session>> {
		let session = self.session.lock().clone();

		Box::pin(async move { Ok(session) })
	}

	fn sign_in<'a>(&'a self, email: &'a Email, _password: &'a str) -> ProviderFuture<'a, Session> {
		self.record(format!("sign_in:{email}"));

		let session = self.session.lock().clone();

		Box::pin(async move {
			session.ok_or(ProviderError::InvalidCredentials {
				reason: "no scripted session".into(),
			})
		})
	}

	fn sign_up<'a>(
		&'a self,
		email: &'a Email,
		_password: &'a str,
		display_name: &'a str,
	) -> ProviderFuture<'a, ()> {
		self.record(format!("sign_up:{email}:{display_name}"));

		Box::pin(async { Ok(()) })
	}

	fn sign_out(&self) -> ProviderFuture<'_, ()> {
		self.record("sign_out");
		self.session.lock().take();

		Box::pin(async { Ok(()) })
	}

	fn send_password_reset<'a>(&'a self, email: &'a Email) -> ProviderFuture<'a, ()> {
		self.record(format!("send_password_reset:{email}"));

		Box::pin(async { Ok(()) })
	}

	fn update_metadata<'a>(
		&'a self,
		name: Option<&'a str>,
		avatar_url: Option<&'a str>,
	) -> ProviderFuture<'a, ()> {
		self.record(format!(
			"update_metadata:{}:{}",
			name.unwrap_or("-"),
			avatar_url.unwrap_or("-")
		));

		let fail = self.fail_metadata.load(Ordering::SeqCst);

		Box::pin(async move {
			if fail {
				Err(ProviderError::Unavailable { reason: "scripted metadata failure".into() })
			} else {
				Ok(())
			}
		})
	}

	fn subscribe_changes(&self, sink: Arc<dyn SessionChangeSink>) {
		*self.sink.lock() = Some(sink);
	}
}

pub fn email_fixture() -> Email {
	Email::new("jane@example.org").expect("Email fixture should be valid.")
}

pub fn session_fixture() -> Session {
	Session {
		user_id: "uid-1".into(),
		email: email_fixture(),
		issued_at: OffsetDateTime::now_utc(),
		expires_at: None,
		metadata: UserMetadata { name: Some("Jane".into()), avatar_url: None },
	}
}

/// Builds a bridge over an in-memory store against the given mock backend.
pub fn build_bridge(
	base_url: &str,
	provider: Arc<dyn IdentityProvider>,
) -> (SessionBridge, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let bridge = SessionBridge::new(BridgeConfig::new(base_url), provider, store)
		.expect("Bridge fixture should build.");

	(bridge, store_backend)
}
