use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::job::Job;
use super::store::JobStore;
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::gumloop::Transformer;
use crate::pipeline::ConversionPipeline;
use crate::verifier::Verifier;

/// A job waiting for a worker.
#[derive(Debug)]
struct QueuedJob {
    id: String,
    proof_text: String,
}

type Receiver = Arc<tokio::sync::Mutex<mpsc::Receiver<QueuedJob>>>;

/// Bounded worker pool running conversions in the background.
///
/// `submit` returns as soon as the job is recorded and queued; at most
/// `workers` pipelines run at once and at most `queue_depth` jobs wait.
/// Results are written back into the shared [`JobStore`].
pub struct JobScheduler {
    store: Arc<JobStore>,
    sender: Mutex<Option<mpsc::Sender<QueuedJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl JobScheduler {
    /// Spawn the worker pool. Must be called inside a tokio runtime with a
    /// config that passed `TheoremicaConfig::validate` (nonzero sizes).
    pub fn start<T, V>(pipeline: ConversionPipeline<T, V>, config: &SchedulerConfig) -> Self
    where
        T: Transformer + Send + Sync + 'static,
        V: Verifier + Send + Sync + 'static,
    {
        let store = Arc::new(JobStore::new());
        let pipeline = Arc::new(pipeline);
        let (sender, receiver) = mpsc::channel(config.queue_depth);
        let receiver: Receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..config.workers)
            .map(|worker| {
                tokio::spawn(worker_loop(
                    worker,
                    Arc::clone(&receiver),
                    Arc::clone(&store),
                    Arc::clone(&pipeline),
                ))
            })
            .collect();

        info!(
            workers = config.workers,
            queue_depth = config.queue_depth,
            "job scheduler started"
        );

        Self {
            store,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// Record a new queued job and hand it to the pool without waiting.
    pub fn submit(&self, proof_text: impl Into<String>) -> Result<String, SchedulerError> {
        let sender = lock(&self.sender)
            .clone()
            .ok_or(SchedulerError::ShuttingDown)?;

        let job = Job::new();
        let id = job.id.clone();
        // Insert first so a worker can never dequeue an id the store lacks.
        self.store.insert(job);

        let queued = QueuedJob {
            id: id.clone(),
            proof_text: proof_text.into(),
        };
        match sender.try_send(queued) {
            Ok(()) => {
                info!(job_id = %id, jobs = self.store.len(), "job queued");
                Ok(id)
            }
            Err(TrySendError::Full(_)) => {
                self.store.remove(&id);
                warn!("job queue is full, rejecting submission");
                Err(SchedulerError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.store.remove(&id);
                Err(SchedulerError::ShuttingDown)
            }
        }
    }

    /// Snapshot of a job's current state.
    pub fn status(&self, id: &str) -> Result<Job, SchedulerError> {
        self.store
            .get(id)
            .ok_or_else(|| SchedulerError::JobNotFound(id.to_string()))
    }

    /// Stop accepting jobs, let the queue drain and wait for every worker.
    pub async fn shutdown(&self) {
        lock(&self.sender).take();
        let workers = std::mem::take(&mut *lock(&self.workers));
        for handle in workers {
            if let Err(e) = handle.await {
                error!(error = %e, "worker task ended abnormally");
            }
        }
        info!("job scheduler stopped");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn worker_loop<T, V>(
    worker: usize,
    receiver: Receiver,
    store: Arc<JobStore>,
    pipeline: Arc<ConversionPipeline<T, V>>,
) where
    T: Transformer + Send + Sync + 'static,
    V: Verifier + Send + Sync + 'static,
{
    debug!(worker, "worker started");
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };
        run_job(worker, job, &store, &pipeline).await;
    }
    debug!(worker, "worker stopped");
}

async fn run_job<T, V>(
    worker: usize,
    job: QueuedJob,
    store: &JobStore,
    pipeline: &Arc<ConversionPipeline<T, V>>,
) where
    T: Transformer + Send + Sync + 'static,
    V: Verifier + Send + Sync + 'static,
{
    let QueuedJob { id, proof_text } = job;

    match store.update(&id, Job::start) {
        Some(Ok(())) => info!(job_id = %id, worker, "job started"),
        Some(Err(e)) => {
            warn!(job_id = %id, error = %e, "skipping job");
            return;
        }
        None => {
            warn!(job_id = %id, "dispatched job is missing from the store");
            return;
        }
    }

    // Run in its own task so a panicking collaborator fails the job, not the worker.
    let pipeline = Arc::clone(pipeline);
    let outcome = tokio::spawn(async move { pipeline.convert(&proof_text).await }).await;

    let recorded = match outcome {
        Ok(Ok(result)) => {
            info!(job_id = %id, valid = result.valid, "job completed");
            store.update(&id, |job| job.complete(result))
        }
        Ok(Err(e)) => {
            warn!(job_id = %id, kind = %e.kind(), error = %e, "job failed");
            let message = e.to_string();
            store.update(&id, |job| job.fail(message))
        }
        Err(e) => {
            error!(job_id = %id, error = %e, "conversion task panicked");
            store.update(&id, |job| job.fail(format!("worker panicked: {e}")))
        }
    };

    if let Some(Err(e)) = recorded {
        error!(job_id = %id, error = %e, "could not record job outcome");
    }
}
