use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuackError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("failed to load {resource} '{id}': {reason}")]
    ResourceLoad {
        resource: &'static str,
        id: String,
        reason: String,
    },
}

impl QuackError {
    pub fn layout(id: &str, reason: impl ToString) -> Self {
        QuackError::ResourceLoad {
            resource: "layout",
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn dictionary(id: &str, reason: impl ToString) -> Self {
        QuackError::ResourceLoad {
            resource: "dictionary",
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuackError>;
