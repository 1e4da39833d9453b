//! # Micro Batcher
//!
//! Groups individually submitted jobs into batches and hands each batch to a
//! pluggable processor, returning every job's result to the caller that
//! submitted it.
//!
//! ## Key Features
//!
//! - **Size or time triggered**: a batch is flushed as soon as `batch_size`
//!   jobs are pending, or when `batch_timeout` elapses with jobs pending
//! - **Per-caller results**: each submission gets its own one-shot reply
//!   slot, so concurrent callers never see each other's results
//! - **Single-writer core**: one background task owns the pending buffer;
//!   producers only talk to it through channels
//! - **Graceful shutdown**: [`Batcher::shutdown()`] flushes whatever is
//!   pending before returning; later submissions fail with
//!   [`BatcherError::ShutDown`]
//!
//! ## Quick Start
//!
//! 1. Define your job payload type
//! 2. Implement [`BatchProcessor`] for your bulk operation
//! 3. Create a [`Batcher`] inside a tokio runtime
//! 4. Call [`Batcher::submit()`] from as many tasks as you like
//!    (or [`Batcher::submit_blocking()`] from plain threads)
//!
//! See `demos/basic_batching.rs` for a complete program.

mod batcher;
pub mod config;
pub mod error;
mod executor;
pub mod types;

pub use batcher::Batcher;
pub use config::{BatcherConfig, BatcherConfigBuilder};
pub use error::BatcherError;
pub use types::{Job, JobResult};

/// Trait for turning a batch of jobs into a batch of results.
///
/// The batcher calls [`process_batch`](Self::process_batch) once per flush
/// and never concurrently with itself. The returned results must match the
/// input one-to-one and in order: `results[i]` is the result for `jobs[i]`.
/// Returning a different number of results fails every caller in that batch
/// with [`BatcherError::ResultCountMismatch`].
///
/// Failures of individual jobs are not the batcher's concern; encode them in
/// [`Output`](Self::Output) (e.g. `Result<T, E>`). The batcher does not
/// retry.
///
/// # Type Parameter
///
/// `D` is the job payload type (e.g. a request body, a record ID).
///
/// # Example
///
/// ```ignore
/// use micro_batcher::*;
///
/// struct Doubler;
///
/// impl BatchProcessor<i64> for Doubler {
///     type Output = i64;
///
///     async fn process_batch(&self, jobs: Vec<Job<i64>>) -> Vec<JobResult<i64, i64>> {
///         jobs.into_iter()
///             .map(|job| {
///                 let doubled = job.data * 2;
///                 JobResult::new(job, doubled)
///             })
///             .collect()
///     }
/// }
/// ```
pub trait BatchProcessor<D>: Send + Sync + 'static
where
    D: Send + 'static,
{
    /// Per-job output produced by this processor.
    type Output: Send + 'static;

    /// Process one batch of jobs, in submission order.
    fn process_batch(
        &self,
        jobs: Vec<Job<D>>,
    ) -> impl std::future::Future<Output = Vec<JobResult<D, Self::Output>>> + Send;
}
