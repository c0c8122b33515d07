//! Auth-domain identities, profile records, and backend credentials.

pub mod identity;
pub mod profile;
pub mod token;

pub use identity::*;
pub use profile::*;
pub use token::*;
