mod auth;
mod builds;
mod health_check;

pub use auth::{get_current_user, login, logout, refresh, register};
pub use builds::{
    create_build, delete_build, get_build, invalid_build_id, list_builds, update_build,
};
pub use health_check::health_check;

use actix_web::HttpResponse;

/// GET /
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json("PCs Database! Browse your favorite build")
}
