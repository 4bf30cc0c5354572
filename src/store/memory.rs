use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Build, BuildChanges, NewUser, User};
use crate::error::{AppError, ConflictError};
use crate::store::{BuildStore, UserStore};

/// Process-local user store
///
/// Username and email uniqueness is checked under the write lock, so the
/// insert behaves like a unique index.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user, as if deleted out of band.
    pub async fn remove(&self, id: Uuid) -> Option<User> {
        self.users.write().await.remove(&id)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;

        let by_username = users.values().find(|u| u.username == username);
        let found = by_username
            .or_else(|| users.values().find(|u| u.email.as_deref() == Some(email)))
            .cloned();

        Ok(found)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == user.username) {
            return Err(ConflictError::UsernameTaken.into());
        }
        if let Some(email) = &user.email {
            if users.values().any(|u| u.email.as_ref() == Some(email)) {
                return Err(ConflictError::EmailTaken.into());
            }
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }
}

/// Process-local build store; keeps insertion order.
#[derive(Clone, Default)]
pub struct InMemoryBuildStore {
    builds: Arc<RwLock<Vec<Build>>>,
}

impl InMemoryBuildStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BuildStore for InMemoryBuildStore {
    async fn list(&self) -> Result<Vec<Build>, AppError> {
        Ok(self.builds.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Build>, AppError> {
        Ok(self.builds.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn insert(
        &self,
        build_name: String,
        price: String,
        builder: String,
    ) -> Result<Build, AppError> {
        let now = Utc::now();
        let build = Build {
            id: Uuid::new_v4(),
            build_name,
            price,
            builder,
            created_at: now,
            updated_at: now,
        };
        self.builds.write().await.push(build.clone());
        Ok(build)
    }

    async fn update(&self, id: Uuid, changes: BuildChanges) -> Result<Option<Build>, AppError> {
        let mut builds = self.builds.write().await;
        let updated = builds.iter_mut().find(|b| b.id == id).map(|build| {
            changes.apply(build);
            build.clone()
        });
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Build>, AppError> {
        let mut builds = self.builds.write().await;
        let index = builds.iter().position(|b| b.id == id);
        Ok(index.map(|index| builds.remove(index)))
    }
}
