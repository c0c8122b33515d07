//! Backend-issued bearer credentials.

// std
use std::num::ParseIntError;
// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping bearer material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Error returned when a stored backend user id cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Backend user id is not a valid integer.")]
pub struct BackendUserIdError(#[from] ParseIntError);

/// Numeric user identifier assigned by the backend; persisted as a stringified integer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BackendUserId(i64);
impl BackendUserId {
	/// Wraps a backend-assigned numeric id.
	pub const fn new(value: i64) -> Self {
		Self(value)
	}

	/// Returns the numeric id.
	pub const fn get(self) -> i64 {
		self.0
	}
}
impl From<BackendUserId> for String {
	fn from(value: BackendUserId) -> Self {
		value.0.to_string()
	}
}
impl TryFrom<String> for BackendUserId {
	type Error = BackendUserIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Ok(Self(value.parse()?))
	}
}
impl Debug for BackendUserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "BackendUserId({})", self.0)
	}
}
impl Display for BackendUserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.0)
	}
}
impl FromStr for BackendUserId {
	type Err = BackendUserIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(s.parse()?))
	}
}

/// Bearer credential minted by the backend token exchange.
///
/// A backend token is meaningful only in association with the provider session that
/// produced it; when the session ends the token must be discarded. Expiry is not
/// tracked client-side; the cache is trusted until the backend says no.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendToken {
	/// Bearer token attached to authenticated backend calls.
	pub token: TokenSecret,
	/// Backend-side user identifier associated with the token.
	pub user_id: BackendUserId,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn user_id_round_trips_as_string() {
		let id = BackendUserId::new(42);
		let payload = serde_json::to_string(&id).expect("User id should serialize to JSON.");

		assert_eq!(payload, "\"42\"");

		let parsed: BackendUserId =
			serde_json::from_str(&payload).expect("Stringified id should deserialize.");

		assert_eq!(parsed, id);
		assert!(serde_json::from_str::<BackendUserId>("\"not-a-number\"").is_err());
	}
}
