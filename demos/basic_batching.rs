use std::sync::Arc;
use std::time::Duration;

use micro_batcher::*;
use tracing_subscriber::EnvFilter;

/// Echoes each job back, pretending to be a bulk API call.
struct EchoProcessor;

impl BatchProcessor<String> for EchoProcessor {
    type Output = String;

    async fn process_batch(&self, jobs: Vec<Job<String>>) -> Vec<JobResult<String, String>> {
        println!("Processing batch of {} jobs", jobs.len());
        // Simulate one round trip for the whole batch
        tokio::time::sleep(Duration::from_millis(50)).await;
        jobs.into_iter()
            .map(|job| {
                let echoed = format!("processed: {}", job.data);
                JobResult::new(job, echoed)
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let batch_size = 10;
    let batcher: Arc<Batcher<String, String>> = Arc::new(Batcher::new(
        EchoProcessor,
        batch_size,
        Duration::from_secs(1),
    )?);

    // One more job than fits in a batch: the last one goes out on the timer.
    let mut handles = Vec::new();
    for i in 0..=batch_size {
        let batcher = Arc::clone(&batcher);
        handles.push(tokio::spawn(async move {
            batcher.submit(Job::new(format!("my job data {}", i))).await
        }));
    }

    for handle in handles {
        let result = handle.await??;
        println!("{} -> {}", result.job.data, result.data);
    }

    batcher.shutdown().await?;
    println!("Batcher shut down");

    Ok(())
}
