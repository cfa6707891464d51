use std::time::Duration;

use serde_aux::field_attributes::deserialize_number_from_string;

use crate::metadata::MetadataClient;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub gcp: GcpSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct GcpSettings {
    #[serde(default)]
    pub project_id: Option<String>,
    pub metadata_base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub metadata_timeout_ms: u64,
}

impl GcpSettings {
    pub fn metadata_client(&self) -> Result<MetadataClient, reqwest::Error> {
        MetadataClient::new(self.metadata_base_url.clone(), self.metadata_timeout())
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    /// The configured project id, if it is set to something non-empty.
    pub fn configured_project_id(&self) -> Option<&str> {
        self.project_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{other} is not supported environment. Try to use `local` or `production`",
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let conf_dir = base_path.join("configuration");
    let env: Environment = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let settings = config::Config::builder()
        .add_source(config_file(&conf_dir, "base")?)
        .add_source(config_file(&conf_dir, env.as_str())?)
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .prefix_separator("_"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

fn config_file(
    conf_dir: &std::path::Path,
    name: &str,
) -> Result<config::File<config::FileSourceFile, config::FileFormat>, config::ConfigError> {
    let path = conf_dir.join(name);
    let path = path
        .to_str()
        .ok_or_else(|| config::ConfigError::Message(format!("{path:?} is not valid UTF-8")))?;

    Ok(config::File::with_name(path).required(true))
}
