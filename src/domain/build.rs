use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A PC build
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: Uuid,
    pub build_name: String,
    pub price: String,
    pub builder: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /pcs`
///
/// Older clients send the builder as `buidler`; both spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBuild {
    pub build_name: Option<String>,
    pub price: Option<String>,
    #[serde(alias = "buidler")]
    pub builder: Option<String>,
}

/// Body of `PUT /pcs/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildChanges {
    pub build_name: Option<String>,
    pub price: Option<String>,
    #[serde(alias = "buidler")]
    pub builder: Option<String>,
}

impl BuildChanges {
    pub fn apply(self, build: &mut Build) {
        if let Some(build_name) = self.build_name {
            build.build_name = build_name;
        }
        if let Some(price) = self.price {
            build.price = price;
        }
        if let Some(builder) = self.builder {
            build.builder = builder;
        }
        build.updated_at = Utc::now();
    }
}
