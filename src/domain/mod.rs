/// Domain records
///
/// Persisted users and PC builds, plus the sanitized views returned to
/// clients.

mod build;
mod user;

pub use build::{Build, BuildChanges, NewBuild};
pub use user::{NewUser, User, UserProfile, UserSummary};
