use chirpy::configuration::get_configuration;
use chirpy::startup::{run, Stores};
use chirpy::store::{PgChirpStore, PgRefreshTokenStore, PgUserStore};
use chirpy::telemetry::{init_telemetry, DEFAULT_LOG_FILTER};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry(DEFAULT_LOG_FILTER);

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

    if configuration.auth.signing_key.is_empty() {
        tracing::error!("auth.signing_key is not set");
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Missing signing key",
        ));
    }

    tracing::info!("Attempting to connect to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
        })?;

    tracing::info!("Database ready");

    let stores = Stores {
        users: Arc::new(PgUserStore::new(pool.clone())),
        refresh_tokens: Arc::new(PgRefreshTokenStore::new(pool.clone())),
        chirps: Arc::new(PgChirpStore::new(pool)),
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!(
        address = %address,
        platform = ?configuration.platform,
        "Server listening"
    );

    let server = run(listener, stores, configuration.auth, configuration.platform)?;
    server.await
}
