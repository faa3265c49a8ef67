/// Convenience result type used across dotorbit.
pub type DotResult<T> = Result<T, DotError>;

/// Top-level error taxonomy used by the effect APIs.
///
/// The compositor itself never fails; errors only surface while building the scene,
/// loading configuration, or sealing a choreography.
#[derive(thiserror::Error, Debug)]
pub enum DotError {
    /// Invalid user-provided configuration or choreography data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while building or sampling tweens.
    #[error("animation error: {0}")]
    Animation(String),

    /// Entity registry violations (duplicate ids, parent chain problems).
    #[error("registry error: {0}")]
    Registry(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DotError {
    /// Build a [`DotError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DotError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`DotError::Registry`] value.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Build a [`DotError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
