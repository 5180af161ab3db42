use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Service configuration, read from the process environment.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_connect_max_elapsed_secs")]
    pub db_connect_max_elapsed_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Builds the PostgreSQL connection URL from the discrete `DB_*` values.
    /// Credentials are percent-encoded.
    pub fn database_url(&self) -> anyhow::Result<String> {
        let mut url = Url::parse(&format!(
            "postgres://{}:{}/{}",
            self.db_host, self.db_port, self.db_name
        ))?;
        url.set_username(&self.db_user)
            .map_err(|_| anyhow::anyhow!("Cannot set user on database URL"))?;
        url.set_password(Some(&self.db_password))
            .map_err(|_| anyhow::anyhow!("Cannot set password on database URL"))?;
        url.query_pairs_mut().append_pair("sslmode", "disable");
        Ok(url.into())
    }

    pub fn db_connect_max_elapsed(&self) -> Duration {
        Duration::from_secs(self.db_connect_max_elapsed_secs)
    }
}

/// Reads a `.env` file from the working directory if there is one.
/// Variables already set in the environment are left untouched.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::info!("Configuration loaded from {}", path.display()),
        Err(err) if err.not_found() => {
            tracing::info!("No .env file found, using environment variables")
        }
        Err(err) => tracing::warn!("Ignoring unreadable .env file: {}", err),
    }
}

fn default_port() -> u16 {
    8080
}

fn default_db_connect_max_elapsed_secs() -> u64 {
    300
}
