use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        ScenarioError::Serialize(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
