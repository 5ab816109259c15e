use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("document is missing its `{field}` identity field")]
    MissingIdentity { field: &'static str },
    #[error("document identity must be a non-empty string")]
    InvalidIdentity,
    #[error("document is not a key-value object")]
    NotAnObject,
    #[error("document does not match `{entity}`: {message}")]
    Shape {
        entity: &'static str,
        message: String,
    },
}

impl DomainError {
    pub fn shape(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Shape {
            entity,
            message: message.into(),
        }
    }
}
