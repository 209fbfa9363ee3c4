use std::process::ExitStatus;

/// Convenience result type used across the compiler.
pub type NeonResult<T> = Result<T, NeonError>;

/// Error taxonomy for the caption compiler and its engine boundary.
///
/// `Config` covers everything a caller can fix before any graph work starts.
/// `Graph` is an internal invariant violation detected at serialization time;
/// it indicates a bug in the builder or splitter, not bad user input, and is
/// never handled by fallback logic.
#[derive(thiserror::Error, Debug)]
pub enum NeonError {
    /// Invalid effect spec, style table, or strict-mode lookup failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A pad was referenced before its producer, or a label escaped the
    /// fan-out legalization pass.
    #[error("graph construction error: {0}")]
    Graph(String),

    /// The external engine exited with a failure status.
    #[error("ffmpeg failed with {status}: {stderr_tail}")]
    Engine {
        status: ExitStatus,
        stderr_tail: String,
    },

    /// Spawn or pipe failure around the engine subprocess.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NeonError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph(msg.into())
    }
}
