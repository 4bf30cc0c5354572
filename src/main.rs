use std::net::TcpListener;
use std::sync::Arc;

use buildvault::configuration::get_configuration;
use buildvault::startup::{run, Stores};
use buildvault::store::{
    InMemoryBuildStore, InMemoryUserStore, PostgresBuildStore, PostgresUserStore,
};
use buildvault::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    // Refuse to serve with missing or shared token secrets
    if let Err(e) = configuration.jwt.ensure_valid() {
        tracing::error!("Invalid JWT configuration: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }

    let stores = if configuration.database.in_memory {
        tracing::warn!("Using in-memory storage; data is lost on restart");
        Stores {
            users: Arc::new(InMemoryUserStore::new()),
            builds: Arc::new(InMemoryBuildStore::new()),
        }
    } else {
        tracing::info!("Attempting to connect to database");

        let pool = PgPoolOptions::new()
            .max_connections(configuration.database.max_connections)
            .connect(&configuration.database.connection_string())
            .await
            .map_err(|e| {
                tracing::error!("Failed to create connection pool: {}", e);
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "Database connection error",
                )
            })?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
        })?;

        tracing::info!("Database connection pool created successfully");

        Stores {
            users: Arc::new(PostgresUserStore::new(pool.clone())),
            builds: Arc::new(PostgresBuildStore::new(pool)),
        }
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, stores, configuration)?;
    tracing::info!("Server started successfully");

    server.await
}
