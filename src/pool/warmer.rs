//! Background warmer: long-lived workers that turn Dirty contexts back into
//! Clean ones off the request path.
//!
//! Workers run on a dedicated `rayon::ThreadPool` sized from the prewarm
//! target, and take jobs from a `crossbeam_channel` queue shared with the
//! request threads. Blocking on that queue is the only place the pool
//! suspends. A second, never-written channel acts as the stop signal:
//! dropping its sender wakes every worker, which exits after the job it is
//! currently running. A job that panics costs only its own context; the
//! worker keeps serving the queue. A running-worker counter guarded by a condvar lets
//! `stop` wait for all loops to finish before teardown continues.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use rayon::ThreadPool as RayonPool;

use crate::engine::FrameEngine;
use crate::error::{Error, Result};
use crate::pool::state::PooledContext;
use crate::pool::Shared;

/// Unit of warmer work.
pub(crate) enum WarmJob<C> {
    /// Allocate and bind a brand-new context for `dict_id` (pool warm-up).
    WarmUp { dict_id: u32 },
    /// Reset a Dirty context returned by a caller.
    Refresh(PooledContext<C>),
}

impl<C> WarmJob<C> {
    /// Dictionary the job concerns, and whether it carries a returned context.
    fn origin(&self) -> (u32, bool) {
        match self {
            WarmJob::WarmUp { dict_id } => (*dict_id, false),
            WarmJob::Refresh(ctx) => (ctx.dict_id(), true),
        }
    }
}

// Number of worker loops still running, plus the condvar `stop` waits on.
type Running = Arc<(Mutex<usize>, Condvar)>;

/// Decrements the running count when a worker loop exits, panics included.
struct RunningGuard(Running);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let (lock, cvar) = &*self.0;
        let mut n = lock.lock();
        *n -= 1;
        if *n == 0 {
            cvar.notify_all();
        }
    }
}

/// Handle to the warmer's worker threads.
pub(crate) struct Warmer {
    pool: RayonPool,
    stop_tx: Option<Sender<()>>,
    running: Running,
    workers: usize,
}

impl Warmer {
    /// Start `workers` loops draining `jobs` on behalf of `shared`.
    pub(crate) fn start<E: FrameEngine>(
        shared: &Arc<Shared<E>>,
        jobs: Receiver<WarmJob<E::Context>>,
        workers: usize,
    ) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("zprewarm-warmer-{i}"))
            .panic_handler(|_| tracing::error!("warmer worker panicked"))
            .build()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let (stop_tx, stop_rx) = bounded::<()>(0);
        let running: Running = Arc::new((Mutex::new(workers), Condvar::new()));

        for worker in 0..workers {
            let shared = Arc::clone(shared);
            let jobs = jobs.clone();
            let stop_rx = stop_rx.clone();
            let guard = RunningGuard(Arc::clone(&running));
            pool.spawn(move || {
                let _guard = guard;
                run_worker(worker, &shared, &jobs, &stop_rx);
            });
        }

        Ok(Warmer {
            pool,
            stop_tx: Some(stop_tx),
            running,
            workers,
        })
    }

    pub(crate) fn workers(&self) -> usize {
        self.workers
    }

    /// Signal every worker to stop and wait until their loops have exited.
    pub(crate) fn stop(&mut self) {
        // Closing the stop channel wakes workers blocked in `select!`.
        drop(self.stop_tx.take());
        let (lock, cvar) = &*self.running;
        let mut n = lock.lock();
        while *n > 0 {
            cvar.wait(&mut n);
        }
        tracing::debug!(
            workers = self.workers,
            threads = self.pool.current_num_threads(),
            "warmer stopped"
        );
    }
}

impl Drop for Warmer {
    fn drop(&mut self) {
        if self.stop_tx.is_some() {
            self.stop();
        }
    }
}

fn run_worker<E: FrameEngine>(
    worker: usize,
    shared: &Shared<E>,
    jobs: &Receiver<WarmJob<E::Context>>,
    stop: &Receiver<()>,
) {
    tracing::debug!(worker, "warmer worker started");
    while !shared.is_closed() {
        select! {
            recv(jobs) -> job => match job {
                Ok(job) => {
                    let (dict_id, refresh) = job.origin();
                    let run = panic::catch_unwind(AssertUnwindSafe(|| shared.run_job(worker, job)));
                    if run.is_err() {
                        shared.job_panicked(worker, dict_id, refresh);
                    }
                    if jobs.is_empty() {
                        shared.trim();
                    }
                }
                Err(_) => break,
            },
            recv(stop) -> _ => break,
        }
    }
    tracing::debug!(worker, "warmer worker exiting");
}
