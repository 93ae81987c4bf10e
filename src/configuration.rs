use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::path::PathBuf;

use config::Config;
use config::ConfigError;
use serde::Deserialize;

use crate::domain::Credentials;
use crate::rapidmail_client::RapidmailClient;
use crate::rapidmail_client::DEFAULT_BASE_URL;

/// Global configuration, loaded from `configuration/*.yaml`. See
/// `get_configuration`.
///
/// Rapidmail credentials are not in here: they are entered by an admin and
/// live in the host's settings store.
#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub rapidmail: RapidmailSettings,
    pub integration: IntegrationSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RapidmailSettings {
    /// Defaults to the production endpoint; tests point this at a mock server
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }

impl RapidmailSettings {
    pub fn client(
        &self,
        credentials: Credentials,
    ) -> RapidmailClient {
        RapidmailClient::new(self.base_url.clone(), credentials)
    }
}

/// How the integration presents itself to the host
#[derive(Deserialize, Clone, Debug)]
pub struct IntegrationSettings {
    /// Key under which credentials are stored in the host's option store
    pub option_key: String,
    pub logo_url: String,
    /// Where the host's global Rapidmail settings page lives; linked from the
    /// integration card while unconfigured
    pub settings_url: String,
    /// Option store used by the CLI host
    pub settings_path: PathBuf,
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid environment: {e}")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`:
/// `base.yaml`, then `{APP_ENVIRONMENT}.yaml` (default `local`), then `APP_`
/// env vars.
///
/// `APP_RAPIDMAIL__BASE_URL=http://localhost:1080` ->
/// `Settings.rapidmail.base_url`
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Message(format!("could not get current dir: {e}")))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or("local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    tracing::debug!("loading config for {env} env");

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are always strings; every field here is a string or path
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
