use thiserror::Error;

#[derive(Error, Debug)]
pub enum GambitError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Observer error: {0}")]
    Observer(String),

    #[error("Simulation task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl GambitError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// True for errors raised while validating parameters (fatal, never retried)
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_) | Self::ConfigParse(_))
    }
}

pub type Result<T> = std::result::Result<T, GambitError>;
