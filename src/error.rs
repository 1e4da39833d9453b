use thiserror::Error;

/// Errors that can occur while submitting to or shutting down a batcher.
#[derive(Error, Debug)]
pub enum BatcherError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("Batcher has been shut down")]
    ShutDown,

    #[error("Batch processor returned {actual} results for {expected} jobs")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("Batch worker stopped before delivering a result")]
    WorkerStopped,

    #[error("Batch worker panicked: {0}")]
    WorkerPanicked(String),
}
