use crate::error::ConfigError;
use crate::matchmaker::roles::RoleList;
use crate::queues::queue_store::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

const DEFAULT_HTTP_BIND: &str = "localhost:8383";
const DEFAULT_QUEUE_CONFIG: &str = "queues.toml";

/// Process configuration read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub guild_id: u64,
    pub host_channel_id: u64,
    pub lobby_channel_id: Option<u64>,
    pub host_role_id: Option<u64>,
    pub http_bind: String,
    pub queue_config_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|x| !x.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            guild_id: parse_id("GUILD_ID", &required("GUILD_ID")?)?,
            host_channel_id: parse_id("HOST_CHANNEL_ID", &required("HOST_CHANNEL_ID")?)?,
            lobby_channel_id: optional_id("LOBBY_CHANNEL_ID", lookup("LOBBY_CHANNEL_ID"))?,
            host_role_id: optional_id("HOST_ROLE_ID", lookup("HOST_ROLE_ID"))?,
            http_bind: lookup("HTTP_BIND").unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string()),
            queue_config_path: lookup("QUEUE_CONFIG")
                .unwrap_or_else(|| DEFAULT_QUEUE_CONFIG.to_string()),
        })
    }
}

fn parse_id(name: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(ConfigError::InvalidId {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

fn optional_id(name: &str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => parse_id(name, &value).map(Some),
        _ => Ok(None),
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    pub name: String,
    pub required_size: usize,
    #[serde(default)]
    pub roles: RoleList,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            name: String::from("ap"),
            required_size: 7,
            roles: RoleList::default(),
        }
    }
}

/// The queue definitions file. The first queue is the default for commands
/// that do not name one (see `QueuePool::resolve`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QueueFile {
    pub queues: Vec<QueueConfig>,
}

impl Default for QueueFile {
    fn default() -> Self {
        QueueFile {
            queues: vec![QueueConfig::default()],
        }
    }
}

impl QueueFile {
    pub async fn load_or_create<P: AsRef<Path>>(path: P) -> Result<QueueFile, ConfigError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };

        if path.exists() {
            let config_str = fs::read_to_string(path).await.map_err(io_err)?;
            Self::parse(&config_str)
        } else {
            let config = QueueFile::default();
            let toml_str = toml::to_string_pretty(&config)?;
            fs::write(path, toml_str).await.map_err(io_err)?;
            log::info!("Wrote default queue config to {}", path.display());
            Ok(config)
        }
    }

    pub fn parse(config_str: &str) -> Result<QueueFile, ConfigError> {
        let config: QueueFile = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.queues.is_empty() {
            return Err(ConfigError::InvalidQueue(String::from(
                "at least one queue must be configured",
            )));
        }

        let mut names = HashSet::new();
        for queue in &self.queues {
            let name = normalize(&queue.name);
            if name.is_empty() {
                return Err(ConfigError::InvalidQueue(String::from(
                    "queue names must not be blank",
                )));
            }
            if !names.insert(name) {
                return Err(ConfigError::InvalidQueue(format!(
                    "queue '{}' is defined twice",
                    queue.name
                )));
            }
            if queue.roles.len() != queue.required_size {
                return Err(ConfigError::InvalidQueue(format!(
                    "queue '{}' needs {} players but lists {} roles",
                    queue.name,
                    queue.required_size,
                    queue.roles.len()
                )));
            }
        }

        Ok(())
    }
}
