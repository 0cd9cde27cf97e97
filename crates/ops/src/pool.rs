//! Bounded worker pool for deferred command work.
//!
//! The pool is a constructed handle, not process state: a bounded inbound
//! queue, an availability queue of per-worker senders, N worker tasks, and a
//! dispatcher task. The dispatcher hands each unit to whichever worker is
//! idle; when none is, the handoff blocks, which backs up the inbound queue
//! and, once its buffer fills, the submitters. That chain is the pool's whole
//! backpressure story.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

type WorkFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// One unit of deferred work. Owned by the dispatcher until handed to
/// exactly one worker; discarded after completion.
pub struct WorkRequest {
    id: Uuid,
    channel_id: String,
    user_id: String,
    command_name: String,
    delay: Duration,
    enqueued_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    job: Option<WorkFuture>,
}

impl WorkRequest {
    pub fn new(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        command_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            command_name: command_name.into(),
            delay: Duration::ZERO,
            enqueued_at: None,
            started_at: None,
            completed_at: None,
            job: None,
        }
    }

    /// Attaches the work itself. Without a job the unit only sleeps its
    /// configured delay, which is what load tests want.
    pub fn with_job(mut self, job: impl Future<Output = ()> + Send + 'static) -> Self {
        self.job = Some(Box::pin(job));
        self
    }

    /// Simulated processing time, served before the job runs.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    fn queue_wait_ms(&self) -> i64 {
        match (self.enqueued_at, self.started_at) {
            (Some(enqueued), Some(started)) => {
                started.signed_duration_since(enqueued).num_milliseconds()
            }
            _ => 0,
        }
    }

    fn service_ms(&self) -> i64 {
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => {
                completed.signed_duration_since(started).num_milliseconds()
            }
            _ => 0,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("worker pool is shut down")]
pub struct PoolClosed;

#[derive(Default)]
struct PoolMetrics {
    submitted: AtomicU64,
    completed: AtomicU64,
    panicked: AtomicU64,
}

/// Point-in-time counter readings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolMetricsSnapshot {
    pub submitted: u64,
    /// Units serviced to completion, crashed jobs included.
    pub completed: u64,
    pub panicked: u64,
}

pub struct WorkerPool {
    inbound_tx: mpsc::Sender<WorkRequest>,
    quit_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    metrics: Arc<PoolMetrics>,
    worker_count: usize,
}

impl WorkerPool {
    /// Spawns the workers and the dispatcher. `workers == 0` means one per
    /// logical core.
    pub fn start(workers: usize, queue_depth: usize) -> Self {
        let worker_count = if workers == 0 {
            std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(4)
        } else {
            workers
        };
        let queue_depth = queue_depth.max(1);

        let (inbound_tx, inbound_rx) = mpsc::channel(queue_depth);
        let (ready_tx, ready_rx) = mpsc::channel(worker_count);
        let (quit_tx, quit_rx) = watch::channel(false);
        let metrics = Arc::new(PoolMetrics::default());

        let mut tasks = Vec::with_capacity(worker_count + 1);
        for worker_id in 0..worker_count {
            tasks.push(tokio::spawn(worker_loop(
                worker_id,
                ready_tx.clone(),
                quit_rx.clone(),
                Arc::clone(&metrics),
            )));
        }
        tasks.push(tokio::spawn(dispatcher_loop(inbound_rx, ready_rx, quit_rx)));

        info!(
            event_name = "pool.started",
            workers = worker_count,
            queue_depth,
            "worker pool running"
        );

        Self { inbound_tx, quit_tx, tasks: Mutex::new(tasks), metrics, worker_count }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Queues a unit of work. Blocks once the inbound buffer is full; fails
    /// only after shutdown.
    pub async fn submit(&self, request: WorkRequest) -> Result<(), PoolClosed> {
        self.inbound_tx.send(request).await.map_err(|_| PoolClosed)?;
        self.metrics.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn metrics(&self) -> PoolMetricsSnapshot {
        PoolMetricsSnapshot {
            submitted: self.metrics.submitted.load(Ordering::Relaxed),
            completed: self.metrics.completed.load(Ordering::Relaxed),
            panicked: self.metrics.panicked.load(Ordering::Relaxed),
        }
    }

    /// Signals quit and joins every task. In-flight units finish; units
    /// still sitting in the inbound queue are dropped.
    pub async fn shutdown(&self) {
        let _ = self.quit_tx.send(true);
        let handles: Vec<JoinHandle<()>> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            let _ = handle.await;
        }
        info!(event_name = "pool.shutdown", "worker pool stopped");
    }
}

async fn dispatcher_loop(
    mut inbound_rx: mpsc::Receiver<WorkRequest>,
    mut ready_rx: mpsc::Receiver<mpsc::Sender<WorkRequest>>,
    mut quit_rx: watch::Receiver<bool>,
) {
    loop {
        let maybe_request = tokio::select! {
            biased;
            _ = quit_rx.changed() => break,
            maybe_request = inbound_rx.recv() => maybe_request,
        };
        let Some(mut request) = maybe_request else { break };
        request.enqueued_at = Some(Utc::now());

        // Blocking handoff to the next idle worker. A worker that quit
        // between registering and receiving bounces the unit back; try the
        // next one.
        loop {
            let worker_tx = tokio::select! {
                biased;
                _ = quit_rx.changed() => return,
                maybe_worker = ready_rx.recv() => {
                    let Some(worker_tx) = maybe_worker else { return };
                    worker_tx
                }
            };
            match worker_tx.send(request).await {
                Ok(()) => break,
                Err(bounced) => request = bounced.0,
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    ready_tx: mpsc::Sender<mpsc::Sender<WorkRequest>>,
    mut quit_rx: watch::Receiver<bool>,
    metrics: Arc<PoolMetrics>,
) {
    let (work_tx, mut work_rx) = mpsc::channel::<WorkRequest>(1);
    loop {
        if ready_tx.send(work_tx.clone()).await.is_err() {
            break;
        }
        tokio::select! {
            // Work first: a unit already handed over finishes before quit is
            // honored.
            biased;
            Some(mut request) = work_rx.recv() => {
                request.started_at = Some(Utc::now());
                if !request.delay.is_zero() {
                    tokio::time::sleep(request.delay).await;
                }
                if let Some(job) = request.job.take() {
                    // Jobs run as their own task so a panic is contained
                    // there instead of taking the worker down.
                    match tokio::spawn(job).await {
                        Ok(()) => {}
                        Err(join_error) if join_error.is_panic() => {
                            metrics.panicked.fetch_add(1, Ordering::Relaxed);
                            error!(
                                event_name = "pool.unit_panicked",
                                worker_id,
                                request_id = %request.id(),
                                command = request.command_name(),
                                channel = %request.channel_id,
                                user = %request.user_id,
                                "work unit panicked"
                            );
                        }
                        Err(_) => {
                            error!(
                                event_name = "pool.unit_aborted",
                                worker_id,
                                request_id = %request.id(),
                                "work unit task was cancelled"
                            );
                        }
                    }
                }
                request.completed_at = Some(Utc::now());
                metrics.completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    event_name = "pool.unit_completed",
                    worker_id,
                    request_id = %request.id(),
                    command = request.command_name(),
                    queue_wait_ms = request.queue_wait_ms(),
                    service_ms = request.service_ms(),
                    "work unit completed"
                );
            }
            _ = quit_rx.changed() => break,
        }
    }
    debug!(worker_id, "worker stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Notify;
    use tokio::time::{sleep, timeout};

    use super::{WorkRequest, WorkerPool};

    async fn wait_until(pool: &WorkerPool, predicate: impl Fn(&WorkerPool) -> bool) {
        timeout(Duration::from_secs(5), async {
            loop {
                if predicate(pool) {
                    return;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("pool never reached the expected state");
    }

    #[tokio::test]
    async fn more_requests_than_workers_all_complete_exactly_once() {
        let pool = WorkerPool::start(2, 16);
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let runs = Arc::clone(&runs);
            let request = WorkRequest::new("C1", "U1", "deploy").with_job(async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            pool.submit(request).await.expect("pool accepts work");
        }

        wait_until(&pool, |pool| pool.metrics().completed == 8).await;
        assert_eq!(runs.load(Ordering::SeqCst), 8);
        let metrics = pool.metrics();
        assert_eq!(metrics.submitted, 8);
        assert_eq!(metrics.panicked, 0);

        pool.shutdown().await;
    }

    #[tokio::test]
    async fn panicking_job_does_not_kill_its_worker() {
        let pool = WorkerPool::start(1, 4);
        let runs = Arc::new(AtomicUsize::new(0));

        pool.submit(WorkRequest::new("C1", "U1", "deploy").with_job(async {
            panic!("scripted job crash");
        }))
        .await
        .expect("pool accepts the crashing job");

        let after = Arc::clone(&runs);
        pool.submit(WorkRequest::new("C1", "U1", "migrate").with_job(async move {
            after.fetch_add(1, Ordering::SeqCst);
        }))
        .await
        .expect("pool accepts work after the crash");

        wait_until(&pool, |pool| pool.metrics().completed == 2).await;
        assert_eq!(pool.metrics().panicked, 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        pool.shutdown().await;
    }

    #[tokio::test]
    async fn zero_workers_falls_back_to_host_parallelism() {
        let pool = WorkerPool::start(0, 4);
        assert!(pool.worker_count() >= 1);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_finishes_in_flight_work_and_drops_queued_units() {
        let pool = Arc::new(WorkerPool::start(1, 8));
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let in_flight = {
            let started = Arc::clone(&started);
            let gate = Arc::clone(&gate);
            let runs = Arc::clone(&runs);
            WorkRequest::new("C1", "U1", "deploy").with_job(async move {
                started.notify_one();
                gate.notified().await;
                runs.fetch_add(1, Ordering::SeqCst);
            })
        };
        pool.submit(in_flight).await.expect("pool accepts the in-flight unit");
        started.notified().await;

        // the only worker is busy, so these can never start
        for _ in 0..3 {
            let runs = Arc::clone(&runs);
            pool.submit(WorkRequest::new("C1", "U1", "migrate").with_job(async move {
                runs.fetch_add(1, Ordering::SeqCst);
            }))
            .await
            .expect("pool accepts queued units");
        }

        let shutdown = tokio::spawn({
            let pool = Arc::clone(&pool);
            async move { pool.shutdown().await }
        });
        gate.notify_one();
        shutdown.await.expect("shutdown completes");

        let metrics = pool.metrics();
        assert_eq!(metrics.completed, 1);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(pool.submit(WorkRequest::new("C1", "U1", "deploy")).await.is_err());
    }

    #[tokio::test]
    async fn delay_only_units_complete_without_a_job() {
        let pool = WorkerPool::start(1, 4);
        pool.submit(
            WorkRequest::new("C1", "U1", "drill").with_delay(Duration::from_millis(10)),
        )
        .await
        .expect("pool accepts a delay-only unit");

        wait_until(&pool, |pool| pool.metrics().completed == 1).await;
        pool.shutdown().await;
    }
}
