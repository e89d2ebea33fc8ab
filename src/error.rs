//! Error types for agent construction.
//!
//! Only loading and validation return errors. Classification, ledger
//! updates and challenge verification are infallible.

use thiserror::Error;

/// Errors raised while building the agent from configuration and data files.
#[derive(Debug, Error)]
pub enum AiGuardError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid behavior pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AiGuardError>;

/// Deserialize a data file as YAML when the extension says so, JSON otherwise.
pub(crate) fn load_data_file<T>(path: &std::path::Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)?;
    if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}
