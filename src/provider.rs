//! Identity-provider collaborator contract.
//!
//! The hosted identity provider is a black box: it owns sessions, verification
//! emails, password resets, and user metadata. The bridge reads session snapshots,
//! delegates credential operations, and subscribes to change pushes. Nothing more.

// self
use crate::{
	_prelude::*,
	auth::Email,
	session::{Session, SessionChange},
};

/// Boxed future returned by [`IdentityProvider`] implementations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Error produced by the identity-provider collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderError {
	/// Provider rejected the supplied credentials.
	#[error("Credentials rejected: {reason}.")]
	InvalidCredentials {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Provider could not be reached or reported an internal failure.
	#[error("Provider unavailable: {reason}.")]
	Unavailable {
		/// Provider- or transport-supplied reason string.
		reason: String,
	},
}
impl From<ProviderError> for Error {
	fn from(e: ProviderError) -> Self {
		match e {
			ProviderError::InvalidCredentials { reason } => Error::InvalidCredentials { reason },
			ProviderError::Unavailable { reason } => Error::ProviderUnavailable { reason },
		}
	}
}

/// Receives session-change notifications pushed by the provider.
pub trait SessionChangeSink
where
	Self: Send + Sync,
{
	/// Delivers one change in the provider's emission order.
	fn on_change(&self, change: SessionChange);
}

/// Contract implemented by the hosted identity-provider adapter.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Returns the provider's current session, if one is established.
	fn current_session(&self) -> ProviderFuture<'_, Option<Session>>;

	/// Authenticates with an email/password pair and returns the resulting session.
	fn sign_in<'a>(&'a self, email: &'a Email, password: &'a str) -> ProviderFuture<'a, Session>;

	/// Registers a new account and requests email verification.
	///
	/// No session is created until the address is verified, so this returns unit
	/// rather than a session.
	fn sign_up<'a>(
		&'a self,
		email: &'a Email,
		password: &'a str,
		display_name: &'a str,
	) -> ProviderFuture<'a, ()>;

	/// Ends the current session.
	fn sign_out(&self) -> ProviderFuture<'_, ()>;

	/// Requests a password-reset email for the address.
	fn send_password_reset<'a>(&'a self, email: &'a Email) -> ProviderFuture<'a, ()>;

	/// Updates the display name and avatar stored in the provider's user metadata.
	fn update_metadata<'a>(
		&'a self,
		name: Option<&'a str>,
		avatar_url: Option<&'a str>,
	) -> ProviderFuture<'a, ()>;

	/// Registers a sink invoked for every subsequent session change.
	fn subscribe_changes(&self, sink: Arc<dyn SessionChangeSink>);
}
