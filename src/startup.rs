use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_build, delete_build, get_build, get_current_user, health_check, index,
    invalid_build_id, list_builds, login, logout, refresh, register, update_build,
};
use crate::store::{BuildStore, UserStore};

/// Storage backends shared by every worker
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub builds: Arc<dyn BuildStore>,
}

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

pub fn run(listener: TcpListener, stores: Stores, settings: Settings) -> Result<Server, std::io::Error> {
    let users = web::Data::from(stores.users);
    let builds = web::Data::from(stores.builds);
    let jwt_config = settings.jwt;
    let jwt_config_data = web::Data::new(jwt_config.clone());
    let allowed_origins = settings.application.allowed_origins;

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware; the logger sits inside CORS so rejected
            // requests still get CORS headers on the way out
            .wrap(LoggerMiddleware)
            .wrap(cors(&allowed_origins))

            // Shared state
            .app_data(users.clone())
            .app_data(builds.clone())
            .app_data(jwt_config_data.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
            }))

            .route("/", web::get().to(index))
            .route("/health_check", web::get().to(health_check))

            // Session routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/logout", web::post().to(logout))
                    .route("/refresh-token", web::post().to(refresh))
                    // Protected: requires a valid access_token cookie
                    .service(
                        web::resource("/user")
                            .wrap(JwtMiddleware::new(jwt_config.clone()))
                            .route(web::get().to(get_current_user)),
                    ),
            )

            // PC builds
            .service(
                web::scope("/pcs")
                    .app_data(web::PathConfig::default().error_handler(invalid_build_id))
                    .route("", web::get().to(list_builds))
                    .route("", web::post().to(create_build))
                    .route("/{id}", web::get().to(get_build))
                    .route("/{id}", web::put().to(update_build))
                    .route("/{id}", web::delete().to(delete_build)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
