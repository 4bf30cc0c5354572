use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Build, BuildChanges, NewUser, User};
use crate::error::AppError;
use crate::store::{BuildStore, UserStore};

const USER_COLUMNS: &str =
    "id, username, name, email, password_hash, version, created_at, updated_at";
const BUILD_COLUMNS: &str = "id, build_name, price, builder, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1 OR email = $2
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, name, email, password_hash, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

#[derive(Clone)]
pub struct PostgresBuildStore {
    pool: PgPool,
}

impl PostgresBuildStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BuildStore for PostgresBuildStore {
    async fn list(&self) -> Result<Vec<Build>, AppError> {
        let builds = sqlx::query_as::<_, Build>(&format!(
            "SELECT {BUILD_COLUMNS} FROM builds ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(builds)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Build>, AppError> {
        let build = sqlx::query_as::<_, Build>(&format!(
            "SELECT {BUILD_COLUMNS} FROM builds WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(build)
    }

    async fn insert(
        &self,
        build_name: String,
        price: String,
        builder: String,
    ) -> Result<Build, AppError> {
        let build = sqlx::query_as::<_, Build>(&format!(
            r#"
            INSERT INTO builds (id, build_name, price, builder, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {BUILD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(build_name)
        .bind(price)
        .bind(builder)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(build)
    }

    async fn update(&self, id: Uuid, changes: BuildChanges) -> Result<Option<Build>, AppError> {
        let build = sqlx::query_as::<_, Build>(&format!(
            r#"
            UPDATE builds
            SET build_name = COALESCE($2, build_name),
                price = COALESCE($3, price),
                builder = COALESCE($4, builder),
                updated_at = $5
            WHERE id = $1
            RETURNING {BUILD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.build_name)
        .bind(changes.price)
        .bind(changes.builder)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(build)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Build>, AppError> {
        let build = sqlx::query_as::<_, Build>(&format!(
            "DELETE FROM builds WHERE id = $1 RETURNING {BUILD_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(build)
    }
}
