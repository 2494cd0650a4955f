use crate::queues::queue_entry::UserId;
use thiserror::Error;

/// Recoverable failures of queue operations, reported back to whoever issued
/// the command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("{user} is already in the queue '{queue}'")]
    AlreadyQueued { queue: String, user: UserId },

    #[error("{user} is not in the queue '{queue}'")]
    NotQueued { queue: String, user: UserId },

    #[error("Could not find queue with name {0}")]
    UnknownQueue(String),

    #[error("Queue '{queue}' holds {available} entries, {requested} were requested")]
    InsufficientEntries {
        queue: String,
        requested: usize,
        available: usize,
    },

    #[error("No round has been formed from queue '{0}' yet")]
    NoRound(String),

    #[error("{user} is not part of round {round}")]
    NotInRound { round: u64, user: UserId },
}

/// Failure to deliver a formed match to an outbound channel. Never rolls back
/// the drain that produced the match.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error(transparent)]
    Discord(#[from] Box<serenity::Error>),

    #[error("No subscribers are listening for matches")]
    NoSubscribers,
}

impl From<serenity::Error> for NotifyError {
    fn from(err: serenity::Error) -> Self {
        NotifyError::Discord(Box::new(err))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("Environment variable {name} is not a valid id: {value}")]
    InvalidId { name: String, value: String },

    #[error("Failed to access queue config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse queue config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write default queue config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid queue definition: {0}")]
    InvalidQueue(String),
}

/// Top-level error returned from startup and the long running services.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discord(#[from] Box<serenity::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::Discord(Box::new(err))
    }
}
