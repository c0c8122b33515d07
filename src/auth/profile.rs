//! Profile records shared by the session store, broker, and synchronizer.

// self
use crate::_prelude::*;

/// Review state of a user's mentor application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentorStatus {
	/// No application submitted.
	#[default]
	None,
	/// Application submitted and awaiting review.
	Pending,
	/// Application approved; the user is listed as a mentor.
	Approved,
	/// Application rejected.
	Rejected,
}
impl MentorStatus {
	/// Returns a stable label suitable for display or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			MentorStatus::None => "none",
			MentorStatus::Pending => "pending",
			MentorStatus::Approved => "approved",
			MentorStatus::Rejected => "rejected",
		}
	}
}
impl Display for MentorStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Mutable profile record owned by the backing stores.
///
/// The client only ever holds a transient, possibly-stale copy; the backend is
/// authoritative for bio/region while the provider's metadata is authoritative for
/// the name/avatar shown on session objects.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserProfile {
	/// Display name.
	pub name: Option<String>,
	/// Free-form biography.
	pub bio: Option<String>,
	/// Region label.
	pub region: Option<String>,
	/// Avatar URL.
	pub avatar_url: Option<String>,
	/// Premium membership flag.
	pub premium: bool,
	/// Mentor application state.
	pub mentor_status: MentorStatus,
	/// Creation instant, when the backing store reports one.
	pub created_at: Option<OffsetDateTime>,
	/// Last-update instant, when the backing store reports one.
	pub updated_at: Option<OffsetDateTime>,
}

/// Subset of profile fields a user can edit locally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileEdits {
	/// New display name.
	pub name: Option<String>,
	/// New biography.
	pub bio: Option<String>,
	/// New region label.
	pub region: Option<String>,
	/// New avatar URL.
	pub avatar_url: Option<String>,
}
impl ProfileEdits {
	/// Sets the display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());

		self
	}

	/// Sets the biography.
	pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
		self.bio = Some(bio.into());

		self
	}

	/// Sets the region label.
	pub fn with_region(mut self, region: impl Into<String>) -> Self {
		self.region = Some(region.into());

		self
	}

	/// Sets the avatar URL.
	pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
		self.avatar_url = Some(avatar_url.into());

		self
	}

	/// Returns `true` when the edits touch fields mirrored into provider metadata.
	pub fn touches_identity_metadata(&self) -> bool {
		self.name.is_some() || self.avatar_url.is_some()
	}
}
