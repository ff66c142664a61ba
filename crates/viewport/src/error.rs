use thiserror::Error;

/// Failure while submitting a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("graphics context lost: {0}")]
    ContextLost(String),
    #[error("render backend failure: {0}")]
    Backend(String),
}

/// Errors returned by the loop controller.
#[derive(Debug, Error)]
pub enum LoopError {
    /// The frame could not be rendered; no further frame was requested.
    #[error("frame failed, loop halted: {0}")]
    Render(#[from] RenderError),
    #[error("loop is already running")]
    AlreadyRunning,
    #[error("loop has been stopped")]
    Stopped,
}

/// Errors from loading or validating a [`crate::ViewerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
