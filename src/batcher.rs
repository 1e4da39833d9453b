use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::config::BatcherConfig;
use crate::error::BatcherError;
use crate::executor::{self, Submission};
use crate::types::{Job, JobResult};
use crate::BatchProcessor;

/// Handle to a running micro-batcher.
///
/// Jobs submitted through the handle are collected by a background tokio
/// task and flushed to the [`BatchProcessor`] when either `batch_size` jobs
/// are pending or `batch_timeout` has elapsed since the last flush. Each
/// caller gets back the result for its own job.
///
/// `D` is the job payload type, `O` the processor's per-job output type.
/// The handle is `Sync`; share it between producers behind an `Arc`.
pub struct Batcher<D, O> {
    config: BatcherConfig,
    submissions: Mutex<Option<mpsc::Sender<Submission<D, O>>>>,
    worker: tokio::sync::Mutex<WorkerState>,
}

/// The coordination task, or how it ended once it has been joined.
enum WorkerState {
    Running(JoinHandle<()>),
    Exited(WorkerExit),
}

#[derive(Debug, Clone)]
enum WorkerExit {
    Clean,
    Panicked(String),
    Cancelled,
}

impl WorkerExit {
    fn from_join(joined: Result<(), JoinError>) -> Self {
        match joined {
            Ok(()) => Self::Clean,
            Err(e) if e.is_panic() => Self::Panicked(e.to_string()),
            Err(_) => Self::Cancelled,
        }
    }

    fn into_result(self) -> Result<(), BatcherError> {
        match self {
            Self::Clean => Ok(()),
            Self::Panicked(message) => Err(BatcherError::WorkerPanicked(message)),
            Self::Cancelled => Err(BatcherError::WorkerStopped),
        }
    }
}

impl<D, O> std::fmt::Debug for Batcher<D, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batcher")
            .field("config", &self.config)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

impl<D, O> Batcher<D, O>
where
    D: Send + 'static,
    O: Send + 'static,
{
    /// Start a batcher that flushes every `batch_size` jobs or every
    /// `batch_timeout`, whichever comes first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<P>(
        processor: P,
        batch_size: usize,
        batch_timeout: Duration,
    ) -> Result<Self, BatcherError>
    where
        P: BatchProcessor<D, Output = O>,
    {
        let config = BatcherConfig::builder()
            .with_batch_size(batch_size)
            .with_batch_timeout(batch_timeout)
            .build();
        Self::with_config(processor, config)
    }

    /// Start a batcher from a full [`BatcherConfig`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_config<P>(processor: P, config: BatcherConfig) -> Result<Self, BatcherError>
    where
        P: BatchProcessor<D, Output = O>,
    {
        config.validate()?;
        let runtime = Handle::try_current()?;

        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let worker = runtime.spawn(executor::run_loop(processor, config.clone(), receiver));

        Ok(Self {
            config,
            submissions: Mutex::new(Some(sender)),
            worker: tokio::sync::Mutex::new(WorkerState::Running(worker)),
        })
    }

    /// Submit a job and wait for its result.
    ///
    /// Resolves once the batch containing the job has been processed.
    /// Fails with [`BatcherError::ShutDown`] if [`shutdown()`](Self::shutdown)
    /// has been called.
    pub async fn submit(&self, job: Job<D>) -> Result<JobResult<D, O>, BatcherError> {
        let (reply, response) = oneshot::channel();
        let sender = self.sender()?;
        sender
            .send(Submission { job, reply })
            .await
            .map_err(|_| BatcherError::WorkerStopped)?;
        // Release our end of the queue before waiting so a concurrent
        // shutdown can close it.
        drop(sender);

        response.await.map_err(|_| BatcherError::WorkerStopped)?
    }

    /// Blocking variant of [`submit()`](Self::submit) for producers running
    /// on plain threads outside the async runtime.
    ///
    /// # Panics
    ///
    /// Panics if called within an asynchronous execution context.
    pub fn submit_blocking(&self, job: Job<D>) -> Result<JobResult<D, O>, BatcherError> {
        let (reply, response) = oneshot::channel();
        let sender = self.sender()?;
        sender
            .blocking_send(Submission { job, reply })
            .map_err(|_| BatcherError::WorkerStopped)?;
        drop(sender);

        response
            .blocking_recv()
            .map_err(|_| BatcherError::WorkerStopped)?
    }

    /// Stop accepting jobs, flush anything still pending, and wait for the
    /// background task to exit.
    ///
    /// Safe to call more than once, concurrently, or again after a previous
    /// call was cancelled: every call returns only after the drain has
    /// finished, and all of them report the same outcome (`Ok(())`, or
    /// [`BatcherError::WorkerPanicked`] if the processor panicked).
    pub async fn shutdown(&self) -> Result<(), BatcherError> {
        let sender = self
            .submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if sender.is_some() {
            debug!("batcher shutdown requested");
        }
        drop(sender);

        let mut worker = self.worker.lock().await;
        let exit = match &mut *worker {
            // Awaited in place: if this future is dropped the handle stays
            // for the next caller.
            WorkerState::Running(handle) => {
                let exit = WorkerExit::from_join(handle.await);
                *worker = WorkerState::Exited(exit.clone());
                exit
            }
            WorkerState::Exited(exit) => exit.clone(),
        };
        exit.into_result()
    }
}

impl<D, O> Batcher<D, O> {
    /// The configuration this batcher was started with.
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Whether [`shutdown()`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn sender(&self) -> Result<mpsc::Sender<Submission<D, O>>, BatcherError> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(BatcherError::ShutDown)
    }
}
