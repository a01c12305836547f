/// Result alias used across the crate.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors surfaced by the capture/compose/encode pipeline.
///
/// Every variant except `Other` maps one-to-one onto an [`ErrorKind`] reported to callers when a
/// run ends in `Failed`. A view that never becomes ready is not an error; see
/// [`crate::Readiness::TimedOut`].
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Narration could not be loaded or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Scene script or options are invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The encoder could not be started with the requested format.
    #[error("encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// A frame was pushed after the sink was finalized.
    #[error("sink closed: {0}")]
    SinkClosed(String),

    /// The encoder failed while streaming or finalizing.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// The run was cancelled by its caller.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Anything else (filesystem, process plumbing) with its context chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Copyable tag for a [`PipelineError`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    /// See [`PipelineError::Asset`].
    Asset,
    /// See [`PipelineError::Configuration`].
    Configuration,
    /// See [`PipelineError::EncoderUnavailable`].
    EncoderUnavailable,
    /// See [`PipelineError::SinkClosed`].
    SinkClosed,
    /// See [`PipelineError::Encoder`].
    Encoder,
    /// See [`PipelineError::Cancelled`].
    Cancelled,
    /// See [`PipelineError::Other`].
    Other,
}

impl PipelineError {
    /// Build an [`PipelineError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`PipelineError::Configuration`].
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build an [`PipelineError::EncoderUnavailable`].
    pub fn encoder_unavailable(msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable(msg.into())
    }

    /// Build a [`PipelineError::SinkClosed`].
    pub fn sink_closed(msg: impl Into<String>) -> Self {
        Self::SinkClosed(msg.into())
    }

    /// Build an [`PipelineError::Encoder`].
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Build a [`PipelineError::Cancelled`].
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Variant tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Asset(_) => ErrorKind::Asset,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::EncoderUnavailable(_) => ErrorKind::EncoderUnavailable,
            Self::SinkClosed(_) => ErrorKind::SinkClosed,
            Self::Encoder(_) => ErrorKind::Encoder,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
