//! Identity attributes presented to the backend during sync and token exchange.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const EMAIL_MAX_LEN: usize = 254;

/// Error returned when email validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum EmailError {
	/// The address was empty.
	#[error("Email address cannot be empty.")]
	Empty,
	/// The address contains whitespace characters.
	#[error("Email address contains whitespace.")]
	ContainsWhitespace,
	/// The address is missing a local part or domain around a single `@`.
	#[error("Email address must contain a local part and a domain separated by `@`.")]
	MalformedAddress,
	/// The address exceeded the allowed character count.
	#[error("Email address exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Validated email address; the primary identity attribute shared with the backend.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);
impl Email {
	/// Creates a new address after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, EmailError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for Email {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for Email {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<Email> for String {
	fn from(value: Email) -> Self {
		value.0
	}
}
impl TryFrom<String> for Email {
	type Error = EmailError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for Email {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for Email {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Email({})", self.0)
	}
}
impl Display for Email {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for Email {
	type Err = EmailError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), EmailError> {
	if view.is_empty() {
		return Err(EmailError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(EmailError::ContainsWhitespace);
	}
	if view.len() > EMAIL_MAX_LEN {
		return Err(EmailError::TooLong { max: EMAIL_MAX_LEN });
	}

	match view.split_once('@') {
		Some((local, domain))
			if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
			Ok(()),
		_ => Err(EmailError::MalformedAddress),
	}
}

/// Identity attributes exchanged with the backend.
///
/// The email is required; the display name and avatar are optional metadata
/// forwarded so the backend record stays in step with the provider session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
	/// Verified email address of the signed-in user.
	pub email: Email,
	/// Display name from the provider's user metadata.
	pub name: Option<String>,
	/// Avatar URL from the provider's user metadata.
	pub avatar_url: Option<String>,
}
impl Identity {
	/// Creates an identity carrying only the required email.
	pub fn new(email: Email) -> Self {
		Self { email, name: None, avatar_url: None }
	}

	/// Attaches a display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());

		self
	}

	/// Attaches an avatar URL.
	pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
		self.avatar_url = Some(avatar_url.into());

		self
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	#[test]
	fn emails_validate_shape() {
		assert!(Email::new("").is_err());
		assert!(Email::new("jane example.org").is_err());
		assert!(Email::new("jane").is_err());
		assert!(Email::new("@example.org").is_err());
		assert!(Email::new("jane@").is_err());
		assert!(Email::new("jane@exa@mple.org").is_err());

		let email = Email::new("jane@example.org").expect("Email fixture should be valid.");

		assert_eq!(email.as_ref(), "jane@example.org");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let payload = "\"jane@example.org\"";
		let email: Email =
			serde_json::from_str(payload).expect("Email should deserialize successfully.");

		assert_eq!(email.as_ref(), "jane@example.org");
		assert!(serde_json::from_str::<Email>("\"with space@example.org\"").is_err());
		assert!(serde_json::from_str::<Email>("\"not-an-address\"").is_err());
	}

	#[test]
	fn length_limit_is_enforced() {
		let local = "a".repeat(EMAIL_MAX_LEN);
		let too_long = format!("{local}@example.org");

		assert!(Email::new(&too_long).is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<Email, u8> = HashMap::from_iter([(
			Email::new("jane@example.org").expect("Email used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("jane@example.org"), Some(&7));
	}

	#[test]
	fn identity_builders_attach_metadata() {
		let email = Email::new("jane@example.org").expect("Email fixture should be valid.");
		let identity =
			Identity::new(email).with_name("Jane").with_avatar_url("https://cdn.example/j.png");

		assert_eq!(identity.name.as_deref(), Some("Jane"));
		assert_eq!(identity.avatar_url.as_deref(), Some("https://cdn.example/j.png"));
	}
}
