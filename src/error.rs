//! Bridge-level error types shared across the session store, token broker, and synchronizer.

// self
use crate::_prelude::*;

/// Bridge-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical bridge error exposed by public APIs.
///
/// Nothing here is fatal to the process: component-internal failures are recovered
/// locally by falling through to the next strategy, and only the terminal outcome
/// reaches the caller.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential-cache storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Identity provider rejected the supplied credentials; user-visible, no retry.
	#[error("Identity provider rejected the credentials: {reason}.")]
	InvalidCredentials {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Identity provider is unreachable; user-visible, suggest retry.
	#[error("Identity provider is unavailable: {reason}.")]
	ProviderUnavailable {
		/// Provider- or transport-supplied reason string.
		reason: String,
	},
	/// Backend refused the token exchange with a non-success status.
	#[error("Backend rejected the token exchange with HTTP {status}: {message}.")]
	ExchangeRejected {
		/// HTTP status code returned by the exchange endpoint.
		status: u16,
		/// Response body, when one was readable.
		message: String,
	},
	/// A backend endpoint outside the token exchange returned a non-success status.
	#[error("Backend returned HTTP {status} for {endpoint}.")]
	RequestRejected {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Endpoint path for diagnostics.
		endpoint: String,
	},
	/// Underlying transport could not complete the request.
	#[error("Network error occurred while calling the backend.")]
	NetworkUnavailable {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// A bounded request exceeded its deadline; distinct from a hard connection failure.
	#[error("Request exceeded its deadline.")]
	Timeout,
	/// Terminal failure of the profile-save fallback chain.
	#[error("Profile save failed: {reason}.")]
	ProfileSaveFailed {
		/// Human-readable reason describing the step that failed.
		reason: String,
	},
	/// No backend token is cached or obtainable for an authenticated call.
	#[error("No backend token is available for the authenticated call.")]
	MissingBackendToken,
	/// Backend responded with malformed JSON.
	#[error("Backend returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl Error {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::NetworkUnavailable { source: Box::new(src) }
	}

	/// HTTP status attached to the error, when the backend produced one.
	pub fn http_status(&self) -> Option<u16> {
		match self {
			Self::ExchangeRejected { status, .. } | Self::RequestRejected { status, .. } =>
				Some(*status),
			Self::ResponseParse { status, .. } => *status,
			_ => None,
		}
	}

	/// Returns `true` when the backend explicitly refused the attached bearer token.
	pub fn is_token_rejection(&self) -> bool {
		matches!(self.http_status(), Some(401 | 403))
	}
}

/// Configuration and validation failures raised by the bridge.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Backend base URL cannot be parsed.
	#[error("Backend base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint path could not be joined onto the base URL.
	#[error("Endpoint path `{path}` cannot be joined onto the base URL.")]
	InvalidEndpoint {
		/// Path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_bridge_error_with_source() {
		let store_error = StoreError::Backend { message: "storage unreachable".into() };
		let bridge_error: Error = store_error.clone().into();

		assert!(matches!(bridge_error, Error::Storage(_)));
		assert!(bridge_error.to_string().contains("storage unreachable"));

		let source = StdError::source(&bridge_error)
			.expect("Bridge error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn token_rejection_covers_unauthorized_and_forbidden() {
		let unauthorized = Error::RequestRejected { status: 401, endpoint: "/users/me".into() };
		let forbidden = Error::RequestRejected { status: 403, endpoint: "/users/me".into() };
		let server_error = Error::RequestRejected { status: 500, endpoint: "/users/me".into() };

		assert!(unauthorized.is_token_rejection());
		assert!(forbidden.is_token_rejection());
		assert!(!server_error.is_token_rejection());
		assert!(!Error::Timeout.is_token_rejection());
	}

	#[test]
	fn http_status_reads_rejections() {
		let rejected = Error::ExchangeRejected { status: 502, message: "bad gateway".into() };

		assert_eq!(rejected.http_status(), Some(502));
		assert_eq!(Error::MissingBackendToken.http_status(), None);
	}
}
