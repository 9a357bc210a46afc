//! Error types for the glance engine.

/// Top-level error type for the transcript engine.
///
/// Reconciliation itself is infallible (every input produces a defined
/// state transition); errors only arise at the configuration, storage,
/// and transport edges.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration load/save or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Saved-turn store read/write error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EngineError>;
