use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use micro_batcher::*;

/// Doubles every payload and remembers the payloads of each batch it saw.
#[derive(Debug, Clone, Default)]
pub struct RecordingDoubler {
    batches: Arc<Mutex<Vec<Vec<i64>>>>,
}

impl RecordingDoubler {
    pub fn batches(&self) -> Vec<Vec<i64>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

impl BatchProcessor<i64> for RecordingDoubler {
    type Output = i64;

    async fn process_batch(&self, jobs: Vec<Job<i64>>) -> Vec<JobResult<i64, i64>> {
        self.batches
            .lock()
            .unwrap()
            .push(jobs.iter().map(|job| job.data).collect());

        jobs.into_iter()
            .map(|job| {
                let doubled = job.data * 2;
                JobResult::new(job, doubled)
            })
            .collect()
    }
}

/// Breaks the processor contract by dropping the last result of every batch.
#[derive(Debug, Clone, Default)]
pub struct ShortChangingProcessor;

impl BatchProcessor<i64> for ShortChangingProcessor {
    type Output = i64;

    async fn process_batch(&self, jobs: Vec<Job<i64>>) -> Vec<JobResult<i64, i64>> {
        let keep = jobs.len().saturating_sub(1);
        jobs.into_iter()
            .take(keep)
            .map(|job| {
                let data = job.data;
                JobResult::new(job, data)
            })
            .collect()
    }
}

/// Takes `delay` per batch and counts the batches it has finished.
#[derive(Debug, Clone)]
pub struct SlowProcessor {
    delay: Duration,
    completed: Arc<AtomicUsize>,
}

impl SlowProcessor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl BatchProcessor<i64> for SlowProcessor {
    type Output = i64;

    async fn process_batch(&self, jobs: Vec<Job<i64>>) -> Vec<JobResult<i64, i64>> {
        tokio::time::sleep(self.delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        jobs.into_iter()
            .map(|job| {
                let data = job.data;
                JobResult::new(job, data)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PanickingProcessor;

impl BatchProcessor<i64> for PanickingProcessor {
    type Output = i64;

    async fn process_batch(&self, _jobs: Vec<Job<i64>>) -> Vec<JobResult<i64, i64>> {
        panic!("processor exploded");
    }
}

pub fn start<P>(processor: P, batch_size: usize, batch_timeout: Duration) -> Arc<Batcher<i64, i64>>
where
    P: BatchProcessor<i64, Output = i64>,
{
    Arc::new(Batcher::new(processor, batch_size, batch_timeout).unwrap())
}
