use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A persisted user record
///
/// `password_hash` is `None` for accounts created through a social login
/// provider. `version` is an internal revision counter and never leaves the
/// server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name carried in the access token: the username, or the email when
    /// the username is blank.
    pub fn display_name(&self) -> &str {
        if !self.username.is_empty() {
            return &self.username;
        }
        self.email.as_deref().unwrap_or_default()
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// User view returned from register and login
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
}

/// User view returned from `GET /auth/user`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: Option<&str>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            name: "Alice Liddell".to_string(),
            email: email.map(str::to_string),
            password_hash: Some("$2b$10$hash".to_string()),
            version: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_display_name_prefers_username() {
        assert_eq!(user("alice", Some("alice@example.com")).display_name(), "alice");
        assert_eq!(user("", Some("alice@example.com")).display_name(), "alice@example.com");
    }

    #[test]
    fn test_views_hide_password_and_version() {
        let user = user("alice", Some("alice@example.com"));

        let summary = serde_json::to_value(user.summary()).unwrap();
        let profile = serde_json::to_value(user.profile()).unwrap();

        for view in [&summary, &profile] {
            assert!(view.get("password_hash").is_none());
            assert!(view.get("password").is_none());
            assert!(view.get("version").is_none());
            assert_eq!(view["id"], user.id.to_string());
        }
        assert!(profile.get("createdAt").is_some());
        assert!(summary.get("createdAt").is_none());
    }
}
