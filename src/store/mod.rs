/// Persistence
///
/// Handlers depend on the `UserStore` / `BuildStore` traits; `postgres`
/// backs them with sqlx, `memory` with in-process maps that enforce the
/// same unique constraints.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Build, BuildChanges, NewUser, User};
use crate::error::AppError;

mod memory;
mod postgres;

pub use memory::{InMemoryBuildStore, InMemoryUserStore};
pub use postgres::{PostgresBuildStore, PostgresUserStore};

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user whose username equals `username` or whose email equals
    /// `email`. A username match wins when both match different records.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Persist a new user.
    ///
    /// # Errors
    /// `AppError::Conflict` when the username or email is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
}

/// Storage for the PC build resource
#[async_trait]
pub trait BuildStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Build>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Build>, AppError>;

    async fn insert(&self, build_name: String, price: String, builder: String)
        -> Result<Build, AppError>;

    async fn update(&self, id: Uuid, changes: BuildChanges) -> Result<Option<Build>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<Option<Build>, AppError>;
}
