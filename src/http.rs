//! Transport primitives for backend calls.
//!
//! The module exposes [`BackendHttpClient`] so shared HTTP behavior lives in one
//! place, plus the transport-error classification that separates deadline overruns
//! from hard connection failures, the distinction the connectivity probe reports.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::ConfigError};

/// Thin wrapper around [`ReqwestClient`] shared by every backend call.
///
/// Requests carry their own explicit deadlines (see [`crate::api::BackendApi`]);
/// the wrapped client is deliberately left at its defaults so a caller-provided
/// client keeps whatever middleware it was built with.
#[derive(Clone, Default)]
pub struct BackendHttpClient(pub ReqwestClient);
impl BackendHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for BackendHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for BackendHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl Debug for BackendHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("BackendHttpClient(..)")
	}
}

/// Parses a backend base URL and strips any trailing slash so endpoint paths join
/// predictably.
pub fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
	let trimmed = raw.trim_end_matches('/');

	Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl { source })
}

/// Maps transport failures onto the bridge taxonomy.
pub(crate) fn classify_transport_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::http_client_build(err).into();
	}
	if err.is_timeout() {
		return Error::Timeout;
	}

	Error::network(err)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn base_urls_lose_trailing_slashes() {
		let url = normalize_base_url("https://api.example.org/v1/")
			.expect("Base URL fixture should parse.");

		assert_eq!(url.as_str(), "https://api.example.org/v1");

		let bare =
			normalize_base_url("https://api.example.org").expect("Bare base URL should parse.");

		assert_eq!(bare.as_str(), "https://api.example.org/");
	}

	#[test]
	fn invalid_base_urls_are_rejected() {
		assert!(matches!(
			normalize_base_url("not a url"),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
	}
}
