use serde::{Deserialize, Serialize};

/// A single unit of work submitted to a batcher.
///
/// The `data` field carries the user-defined payload. Jobs have no identity
/// of their own; the batcher pairs each one with its caller by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job<D> {
    pub data: D,
}

impl<D> Job<D> {
    pub fn new(data: D) -> Self {
        Self { data }
    }
}

/// Result of processing a single job: the originating job and the
/// processor's output for it.
///
/// Per-job failures belong in `O` (e.g. `Result<T, E>`); the batcher does
/// not inspect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult<D, O> {
    pub job: Job<D>,
    pub data: O,
}

impl<D, O> JobResult<D, O> {
    pub fn new(job: Job<D>, data: O) -> Self {
        Self { job, data }
    }
}

/// Why the coordination loop flushed a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlushReason {
    /// The pending buffer reached the batch size.
    Size,
    /// The batch timeout elapsed with jobs pending.
    Timeout,
    /// The submission queue closed; final flush before exit.
    Drain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_result_keeps_job() {
        let job = Job::new(21);
        let result = JobResult::new(job.clone(), 42);
        assert_eq!(result.job, job);
        assert_eq!(result.data, 42);
    }
}
