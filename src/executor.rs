use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

use crate::config::BatcherConfig;
use crate::error::BatcherError;
use crate::types::{FlushReason, Job, JobResult};
use crate::BatchProcessor;

pub(crate) type Reply<D, O> = oneshot::Sender<Result<JobResult<D, O>, BatcherError>>;

/// A job on its way to the coordination loop, with the slot its result
/// goes back through.
pub(crate) struct Submission<D, O> {
    pub(crate) job: Job<D>,
    pub(crate) reply: Reply<D, O>,
}

/// The coordination loop. Sole owner of the pending buffer and the flush
/// deadline; runs until every submission sender has been dropped, then
/// drains whatever is pending and returns.
pub(crate) async fn run_loop<D, P>(
    processor: P,
    config: BatcherConfig,
    mut submissions: mpsc::Receiver<Submission<D, P::Output>>,
) where
    D: Send + 'static,
    P: BatchProcessor<D>,
{
    let mut pending: Vec<Submission<D, P::Output>> = Vec::with_capacity(config.batch_size);
    let mut deadline = Instant::now() + config.batch_timeout;

    debug!(
        batch_size = config.batch_size,
        batch_timeout = ?config.batch_timeout,
        "batch worker started"
    );

    loop {
        tokio::select! {
            // Submissions first: a job that fills the batch flushes before the timer is looked at.
            biased;

            received = submissions.recv() => match received {
                Some(submission) => {
                    pending.push(submission);
                    if pending.len() >= config.batch_size {
                        flush(&processor, &mut pending, FlushReason::Size).await;
                        deadline = Instant::now() + config.batch_timeout;
                    }
                }
                None => {
                    if !pending.is_empty() {
                        flush(&processor, &mut pending, FlushReason::Drain).await;
                    }
                    debug!("submission queue closed, batch worker exiting");
                    return;
                }
            },

            _ = sleep_until(deadline) => {
                if pending.is_empty() {
                    trace!("batch timeout elapsed with nothing pending");
                } else {
                    flush(&processor, &mut pending, FlushReason::Timeout).await;
                }
                deadline = Instant::now() + config.batch_timeout;
            }
        }
    }
}

/// Hand the pending buffer to the processor as one batch and route each
/// result back to the caller that submitted the matching job.
async fn flush<D, P>(
    processor: &P,
    pending: &mut Vec<Submission<D, P::Output>>,
    reason: FlushReason,
) where
    D: Send + 'static,
    P: BatchProcessor<D>,
{
    let (jobs, replies): (Vec<_>, Vec<_>) = pending
        .drain(..)
        .map(|submission| (submission.job, submission.reply))
        .unzip();
    let expected = jobs.len();

    debug!(batch_size = expected, ?reason, "flushing batch");

    let results = processor.process_batch(jobs).await;

    if results.len() != expected {
        warn!(
            expected,
            actual = results.len(),
            ?reason,
            "batch processor returned the wrong number of results, failing the whole batch"
        );
        for reply in replies {
            let _ = reply.send(Err(BatcherError::ResultCountMismatch {
                expected,
                actual: results.len(),
            }));
        }
        return;
    }

    // A dropped receiver means the caller stopped waiting.
    for (reply, result) in replies.into_iter().zip(results) {
        let _ = reply.send(Ok(result));
    }
}
