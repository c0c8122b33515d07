//! Typed backend REST endpoints consumed by the bridge.

// crates.io
use reqwest::Response;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{
		BackendToken, BackendUserId, Email, Identity, MentorStatus, ProfileEdits, TokenSecret,
		UserProfile,
	},
	error::ConfigError,
	http::{BackendHttpClient, classify_transport_error, normalize_base_url},
};

/// Backend REST client with a normalized base URL and explicit request deadlines.
///
/// Deadlines are configured here rather than inherited from the transport, so a
/// caller-provided [`BackendHttpClient`] never silently changes the bridge's
/// timeout behavior.
#[derive(Clone, Debug)]
pub struct BackendApi {
	http: BackendHttpClient,
	base: Url,
	request_timeout: StdDuration,
}
impl BackendApi {
	/// Default per-request deadline for exchange and profile calls.
	pub const DEFAULT_REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);
	/// Default deadline for the lightweight connectivity probe.
	pub const DEFAULT_CONNECTIVITY_TIMEOUT: StdDuration = StdDuration::from_secs(5);

	/// Creates a client over the default reqwest transport.
	pub fn new(base_url: &str) -> Result<Self, ConfigError> {
		Self::with_http_client(base_url, BackendHttpClient::default())
	}

	/// Creates a client that reuses a caller-provided transport.
	pub fn with_http_client(base_url: &str, http: BackendHttpClient) -> Result<Self, ConfigError> {
		Ok(Self {
			http,
			base: normalize_base_url(base_url)?,
			request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
		})
	}

	/// Overrides the per-request deadline.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Normalized backend base URL.
	pub fn base_url(&self) -> &Url {
		&self.base
	}

	fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let joined =
			format!("{}/{}", self.base.as_str().trim_end_matches('/'), path.trim_start_matches('/'));

		Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}

	/// Idempotent create-or-update of the backend user record (`POST /users/sync`).
	///
	/// The success body is ignored; repeating the call with identical attributes has
	/// no observable effect on later exchanges.
	pub async fn sync_user(&self, request: &SyncUserRequest) -> Result<()> {
		let url = self.endpoint("users/sync")?;
		let response = self
			.http
			.post(url)
			.timeout(self.request_timeout)
			.json(request)
			.send()
			.await
			.map_err(classify_transport_error)?;

		ensure_success(&response, "/users/sync")
	}

	/// Exchanges identity attributes for a backend bearer token (`POST /users/sync-token`).
	pub async fn exchange_token(&self, identity: &Identity) -> Result<BackendToken> {
		let url = self.endpoint("users/sync-token")?;
		let request = TokenExchangeRequest::from(identity);
		let response = self
			.http
			.post(url)
			.timeout(self.request_timeout)
			.json(&request)
			.send()
			.await
			.map_err(classify_transport_error)?;
		let status = response.status();

		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();

			return Err(Error::ExchangeRejected { status: status.as_u16(), message });
		}

		let payload: TokenExchangeResponse = decode_json(response).await?;

		Ok(BackendToken {
			token: TokenSecret::new(payload.access_token),
			user_id: BackendUserId::new(payload.user_id),
		})
	}

	/// Authenticated profile update (`PUT /users/me`).
	pub async fn update_profile(
		&self,
		token: &TokenSecret,
		request: &ProfileUpdateRequest,
	) -> Result<()> {
		let url = self.endpoint("users/me")?;
		let response = self
			.http
			.put(url)
			.timeout(self.request_timeout)
			.bearer_auth(token.expose())
			.json(request)
			.send()
			.await
			.map_err(classify_transport_error)?;

		ensure_success(&response, "/users/me")
	}

	/// Unauthenticated id-scoped fallback update for onboarding (`PUT /users/{id}/profile`).
	pub async fn update_profile_by_id(
		&self,
		user_id: BackendUserId,
		request: &ProfileUpdateRequest,
	) -> Result<()> {
		let url = self.endpoint(&format!("users/{user_id}/profile"))?;
		let response = self
			.http
			.put(url)
			.timeout(self.request_timeout)
			.json(request)
			.send()
			.await
			.map_err(classify_transport_error)?;

		ensure_success(&response, "/users/{id}/profile")
	}

	/// Fetches the backend profile snapshot (`GET /users/{id}`).
	pub async fn fetch_user(&self, user_id: BackendUserId) -> Result<BackendUserRecord> {
		let url = self.endpoint(&format!("users/{user_id}"))?;
		let response = self
			.http
			.get(url)
			.timeout(self.request_timeout)
			.send()
			.await
			.map_err(classify_transport_error)?;

		ensure_success(&response, "/users/{id}")?;

		decode_json(response).await
	}

	/// Submits a mentor application (`POST /mentors/dev/become-mentor`).
	pub async fn become_mentor(
		&self,
		token: &TokenSecret,
		request: &MentorApplicationRequest,
	) -> Result<MentorApplication> {
		let url = self.endpoint("mentors/dev/become-mentor")?;
		let response = self
			.http
			.post(url)
			.timeout(self.request_timeout)
			.bearer_auth(token.expose())
			.json(request)
			.send()
			.await
			.map_err(classify_transport_error)?;

		ensure_success(&response, "/mentors/dev/become-mentor")?;

		decode_json(response).await
	}

	/// Lightweight connectivity probe against the API root, bounded by `deadline`.
	///
	/// A deadline overrun surfaces as [`Error::Timeout`], distinct from the
	/// [`Error::NetworkUnavailable`] a refused connection produces.
	pub async fn check_connectivity(&self, deadline: StdDuration) -> Result<serde_json::Value> {
		let response = self
			.http
			.get(self.base.clone())
			.timeout(deadline)
			.send()
			.await
			.map_err(classify_transport_error)?;

		ensure_success(&response, "/")?;

		decode_json(response).await
	}
}

fn ensure_success(response: &Response, endpoint: &str) -> Result<()> {
	let status = response.status();

	if status.is_success() {
		Ok(())
	} else {
		Err(Error::RequestRejected { status: status.as_u16(), endpoint: endpoint.to_owned() })
	}
}

async fn decode_json<T>(response: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let status = response.status().as_u16();
	let bytes = response.bytes().await.map_err(classify_transport_error)?;
	let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::ResponseParse { source, status: Some(status) })
}

/// Request body for `POST /users/sync`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncUserRequest {
	/// Email address keying the backend user record.
	pub email: Email,
	/// Display name, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Avatar URL, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profile_photo_url: Option<String>,
	/// Biography, when the sync should seed one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bio: Option<String>,
}
impl SyncUserRequest {
	/// Builds a sync request from identity attributes, without a biography.
	pub fn from_identity(identity: &Identity) -> Self {
		Self {
			email: identity.email.clone(),
			name: identity.name.clone(),
			profile_photo_url: identity.avatar_url.clone(),
			bio: None,
		}
	}

	/// Seeds the biography forwarded with the sync.
	pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
		self.bio = Some(bio.into());

		self
	}
}

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
	email: &'a Email,
	#[serde(skip_serializing_if = "Option::is_none")]
	name: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	profile_photo_url: Option<&'a str>,
}
impl<'a> From<&'a Identity> for TokenExchangeRequest<'a> {
	fn from(identity: &'a Identity) -> Self {
		Self {
			email: &identity.email,
			name: identity.name.as_deref(),
			profile_photo_url: identity.avatar_url.as_deref(),
		}
	}
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
	access_token: String,
	user_id: i64,
}

/// Request body shared by the authenticated and id-scoped profile updates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdateRequest {
	/// New display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// New biography.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bio: Option<String>,
	/// New region label.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
	/// New avatar URL.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profile_photo_url: Option<String>,
}
impl From<&ProfileEdits> for ProfileUpdateRequest {
	fn from(edits: &ProfileEdits) -> Self {
		Self {
			name: edits.name.clone(),
			bio: edits.bio.clone(),
			region: edits.region.clone(),
			profile_photo_url: edits.avatar_url.clone(),
		}
	}
}

/// Backend user snapshot returned by `GET /users/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BackendUserRecord {
	/// Backend-assigned numeric id.
	#[serde(default)]
	pub user_id: Option<i64>,
	/// Email address on the record.
	#[serde(default)]
	pub email: Option<String>,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Biography.
	#[serde(default)]
	pub bio: Option<String>,
	/// Region label.
	#[serde(default)]
	pub region: Option<String>,
	/// Avatar URL.
	#[serde(default)]
	pub profile_photo_url: Option<String>,
	/// Premium membership flag.
	#[serde(default)]
	pub premium: bool,
	/// Mentor application state.
	#[serde(default)]
	pub mentor_status: MentorStatus,
}
impl BackendUserRecord {
	/// Converts the snapshot into the shared profile type.
	pub fn into_profile(self) -> UserProfile {
		UserProfile {
			name: self.name,
			bio: self.bio,
			region: self.region,
			avatar_url: self.profile_photo_url,
			premium: self.premium,
			mentor_status: self.mentor_status,
			created_at: None,
			updated_at: None,
		}
	}
}

/// Request body for `POST /mentors/dev/become-mentor`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MentorApplicationRequest {
	/// Expertise areas declared by the applicant.
	pub expertise_areas: Vec<String>,
	/// Availability label (e.g. `available`).
	pub availability_status: String,
}

/// Mentor application record returned by the backend.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MentorApplication {
	/// Backend-assigned application id, when one is reported.
	#[serde(default)]
	pub id: Option<i64>,
	/// Review status label (typically `pending`).
	pub status: String,
}
