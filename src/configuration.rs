use secrecy::SecretString;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
}

#[derive(Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Deserialize)]
pub struct DatabaseSettings {
    pub path: String,
}

#[derive(Deserialize)]
pub struct SessionSettings {
    /// Secret used to sign session tokens. Has no default on purpose.
    pub secret: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub token_ttl_hours: i64,
}

/// Layered configuration: optional `configuration.yaml` next to the binary,
/// overridden by `APP__`-prefixed environment variables
/// (e.g. `APP__APPLICATION__PORT=8080`, `APP__SESSION__SECRET=...`).
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 8080_i64)?
        .set_default("database.path", "screening.db")?
        .set_default("session.token_ttl_hours", 24_i64)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}
