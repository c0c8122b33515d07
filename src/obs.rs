//! Optional observability helpers for bridge operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `session_bridge.op` with the `op` and
//!   `stage` (call site) fields.
//! - Enable `metrics` to increment the `session_bridge_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Bridge operations observed across the session store, broker, and synchronizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Email/password sign-in through the identity provider.
	SignIn,
	/// Account registration with email verification.
	SignUp,
	/// Session teardown and cache invalidation.
	SignOut,
	/// Backend token exchange.
	TokenExchange,
	/// Profile-save fallback chain.
	ProfileSave,
	/// Mentor application submission.
	MentorApplication,
	/// Bounded connectivity probe.
	Connectivity,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::SignIn => "sign_in",
			OpKind::SignUp => "sign_up",
			OpKind::SignOut => "sign_out",
			OpKind::TokenExchange => "token_exchange",
			OpKind::ProfileSave => "profile_save",
			OpKind::MentorApplication => "mentor_application",
			OpKind::Connectivity => "connectivity",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a bridge helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the terminal outcome derived from a result.
pub fn record_op_result<T>(kind: OpKind, result: &Result<T>) {
	match result {
		Ok(_) => record_op_outcome(kind, OpOutcome::Success),
		Err(_) => record_op_outcome(kind, OpOutcome::Failure),
	}
}
