use config::ConfigError;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub platform: Platform,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Token issuance settings, injected into the session service and middleware
#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    /// HMAC secret for access tokens
    pub signing_key: String,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: i64,
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,
}

impl AuthSettings {
    pub fn new(signing_key: impl Into<String>) -> Self {
        Self {
            signing_key: signing_key.into(),
            access_token_ttl_secs: default_access_token_ttl_secs(),
            refresh_token_ttl_days: default_refresh_token_ttl_days(),
        }
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_ttl_days)
    }
}

fn default_access_token_ttl_secs() -> i64 {
    3600
}

fn default_refresh_token_ttl_days() -> i64 {
    60
}

/// Deployment mode. Administrative resets are only allowed in `Dev`.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    #[default]
    Production,
}

/// Load settings from `configuration.yaml` (optional) and `APP_*` environment
/// variables, e.g. `APP_AUTH__SIGNING_KEY`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
