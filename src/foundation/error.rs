/// Convenience result type used across the studio engine.
pub type StudioResult<T> = Result<T, StudioError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// An element or document invariant was violated; the mutation was rejected whole.
    #[error("validation error: {0}")]
    Validation(String),

    /// Export was requested before any surface had been painted.
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// An image source could not be fetched or decoded.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// A collaborator round-trip (persistence, upload, pdf assembly) failed.
    #[error("io error during {op}: {message}")]
    Io {
        /// Collaborator operation that failed, e.g. `save_project`.
        op: String,
        /// Failure description as reported by the collaborator.
        message: String,
    },

    /// Rasterization could not be performed.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Build a [`StudioError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StudioError::SurfaceUnavailable`] value.
    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    /// Build a [`StudioError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`StudioError::Io`] value.
    pub fn io(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            op: op.into(),
            message: message.into(),
        }
    }

    /// Build a [`StudioError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StudioError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
