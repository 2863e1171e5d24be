//! Prewarmed encoder-context pool.
//!
//! Binding a dictionary into an encoder context is expensive; encoding with
//! an already-bound context is not. [`PrewarmPool`] keeps, per registered
//! dictionary, a set of Clean (bound, idle) contexts so that a request only
//! pays for the encode itself:
//!
//! 1. [`PrewarmPool::borrow`] pops a Clean context, or, when none is ready,
//!    allocates and binds one synchronously. It never waits for the warmer.
//! 2. The caller encodes through the returned [`ContextLease`].
//! 3. Dropping the lease marks the context Dirty and queues it for the
//!    background [`warmer`](self::warmer), which resets it and deposits it
//!    back into the Clean set.
//!
//! Each context has exactly one owner at any time: the Clean set, one
//! caller, or the warmer queue. Ownership moves only by value through
//! `borrow`, the lease drop, and the queue.
//!
//! # Population
//! At construction `target` warm-up jobs per dictionary are queued, so the
//! Clean set fills in the background. Under load the pool may hold more than
//! `target` contexts (one per concurrent fallback); once the warmer's queue
//! goes idle it retires Clean contexts beyond `target`.
//!
//! # Shutdown
//! [`PrewarmPool::shutdown`] stops the warmer after its current jobs,
//! destroys queued and Clean contexts, and switches the pool into
//! pass-through mode: later borrows are served by synchronous creation and
//! every returned context is destroyed instead of recycled.

pub mod context_pool;
pub mod lease;
pub mod state;
pub mod warmer;

pub use context_pool::PoolStats;
pub use lease::ContextLease;
pub use state::{ContextState, PooledContext};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::config::warmer_workers;
use crate::dict::DictRegistry;
use crate::engine::FrameEngine;
use crate::error::{Error, Result};
use context_pool::ContextPool;
use warmer::{WarmJob, Warmer};

/// State shared by request threads and warmer workers.
pub(crate) struct Shared<E: FrameEngine> {
    engine: Arc<E>,
    pools: HashMap<u32, ContextPool<E::Context>>,
    closed: AtomicBool,
    jobs_tx: Sender<WarmJob<E::Context>>,
    jobs_rx: Receiver<WarmJob<E::Context>>,
}

impl<E: FrameEngine> Shared<E> {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Allocate a context for `pool`'s dictionary and bind it.
    fn fresh_clean(&self, pool: &ContextPool<E::Context>) -> Result<PooledContext<E::Context>> {
        let dict = pool.dict();
        let mut ctx = PooledContext::new(self.engine.new_context()?, dict.id());
        if let Err(err) = self.engine.reset_context(ctx.inner_mut(), Some(dict)) {
            pool.note_reset_failure();
            ctx.destroy();
            return Err(err);
        }
        ctx.transition(ContextState::Clean)?;
        pool.note_created();
        Ok(ctx)
    }

    /// `Return`: mark Dirty and hand to the warmer, or destroy after shutdown.
    pub(crate) fn give_back(&self, mut ctx: PooledContext<E::Context>) {
        let Some(pool) = self.pools.get(&ctx.dict_id()) else {
            ctx.destroy();
            return;
        };
        if let Err(err) = ctx.transition(ContextState::Dirty) {
            tracing::warn!(dict_id = ctx.dict_id(), %err, "dropping context in unexpected state");
            pool.checkin();
            ctx.destroy();
            return;
        }
        if self.is_closed() {
            pool.note_discarded();
            pool.checkin();
            ctx.destroy();
            return;
        }
        // Unbounded: never blocks the caller.
        if let Err(err) = self.jobs_tx.send(WarmJob::Refresh(ctx)) {
            self.discard_job(err.into_inner());
            return;
        }
        // Shutdown may have drained the queue between the check and the send.
        if self.is_closed() {
            self.drain_jobs();
        }
    }

    /// Execute one warmer job.
    pub(crate) fn run_job(&self, worker: usize, job: WarmJob<E::Context>) {
        match job {
            WarmJob::WarmUp { dict_id } => {
                if let Some(pool) = self.pools.get(&dict_id) {
                    match self.fresh_clean(pool) {
                        Ok(ctx) => self.deposit(pool, ctx),
                        Err(err) => {
                            tracing::warn!(dict_id, worker, %err, "warm-up failed, context discarded");
                        }
                    }
                    pool.warming_finished();
                }
            }
            WarmJob::Refresh(mut ctx) => {
                let dict_id = ctx.dict_id();
                let Some(pool) = self.pools.get(&dict_id) else {
                    ctx.destroy();
                    return;
                };
                let reset = self
                    .engine
                    .reset_context(ctx.inner_mut(), Some(pool.dict()))
                    .and_then(|()| ctx.transition(ContextState::Clean));
                match reset {
                    Ok(()) => self.deposit(pool, ctx),
                    Err(err) => {
                        // Only this context is lost; natural demand recreates one.
                        tracing::warn!(dict_id, worker, %err, "reset failed, context discarded");
                        pool.note_reset_failure();
                        ctx.destroy();
                    }
                }
                pool.checkin();
            }
        }
    }

    /// Settle the books for a job whose engine call panicked. The context
    /// it carried was dropped during unwinding.
    pub(crate) fn job_panicked(&self, worker: usize, dict_id: u32, refresh: bool) {
        tracing::error!(dict_id, worker, refresh, "warmer job panicked, context discarded");
        let Some(pool) = self.pools.get(&dict_id) else {
            return;
        };
        pool.note_reset_failure();
        if refresh {
            pool.checkin();
        } else {
            pool.warming_finished();
        }
    }

    fn deposit(&self, pool: &ContextPool<E::Context>, ctx: PooledContext<E::Context>) {
        if self.is_closed() {
            ctx.destroy();
        } else {
            pool.put_clean(ctx);
        }
    }

    /// Retire Clean contexts beyond target in every dictionary's pool.
    pub(crate) fn trim(&self) {
        for (&dict_id, pool) in &self.pools {
            let surplus = pool.take_surplus();
            if !surplus.is_empty() {
                tracing::debug!(dict_id, retired = surplus.len(), "clean set trimmed to target");
            }
            surplus.into_iter().for_each(PooledContext::destroy);
        }
    }

    fn discard_job(&self, job: WarmJob<E::Context>) {
        match job {
            WarmJob::WarmUp { dict_id } => {
                if let Some(pool) = self.pools.get(&dict_id) {
                    pool.warming_finished();
                }
            }
            WarmJob::Refresh(ctx) => {
                if let Some(pool) = self.pools.get(&ctx.dict_id()) {
                    pool.note_discarded();
                    pool.checkin();
                }
                ctx.destroy();
            }
        }
    }

    fn drain_jobs(&self) {
        while let Ok(job) = self.jobs_rx.try_recv() {
            self.discard_job(job);
        }
    }
}

/// Per-dictionary pools of prewarmed contexts and the warmer refreshing them.
///
/// Several independent pools can coexist in one process; each owns its own
/// warmer threads.
pub struct PrewarmPool<E: FrameEngine> {
    shared: Arc<Shared<E>>,
    warmer: Mutex<Option<Warmer>>,
    target: usize,
}

impl<E: FrameEngine> PrewarmPool<E> {
    /// Create one pool per dictionary in `registry`, each converging to
    /// `target` Clean contexts, and start the warmer.
    ///
    /// Warm-up runs in the background; this call does not wait for it.
    pub fn new(engine: Arc<E>, registry: &DictRegistry, target: usize) -> Result<Self> {
        if target == 0 {
            return Err(Error::InvalidOption(
                "prewarm concurrency must be at least 1 for a prewarm pool".to_string(),
            ));
        }
        let pools = registry
            .iter()
            .map(|dict| (dict.id(), ContextPool::new(dict.clone(), target)))
            .collect::<HashMap<_, _>>();
        let (jobs_tx, jobs_rx) = unbounded();
        let shared = Arc::new(Shared {
            engine,
            pools,
            closed: AtomicBool::new(false),
            jobs_tx,
            jobs_rx,
        });

        let workers = warmer_workers(target);
        let warmer = Warmer::start(&shared, shared.jobs_rx.clone(), workers)?;
        for (&dict_id, pool) in &shared.pools {
            pool.warming_started(target);
            for _ in 0..target {
                if let Err(err) = shared.jobs_tx.send(WarmJob::WarmUp { dict_id }) {
                    shared.discard_job(err.into_inner());
                }
            }
        }
        tracing::debug!(
            dictionaries = shared.pools.len(),
            target,
            workers,
            "prewarm pool started"
        );

        Ok(PrewarmPool {
            shared,
            warmer: Mutex::new(Some(warmer)),
            target,
        })
    }

    /// `Borrow`: take a Clean context bound to `dict_id`.
    ///
    /// Served from the Clean set when possible; otherwise a context is
    /// allocated and bound on the calling thread (the fallback path). Never
    /// blocks on the warmer. Bind failures on the fallback path are returned
    /// to the caller; the failed context is discarded.
    pub fn borrow(&self, dict_id: u32) -> Result<ContextLease<E>> {
        let shared = &self.shared;
        let pool = shared
            .pools
            .get(&dict_id)
            .ok_or(Error::UnknownDictionary(dict_id))?;
        let clean = if shared.is_closed() {
            None
        } else {
            pool.take_clean()
        };
        let mut ctx = match clean {
            Some(ctx) => ctx,
            None => {
                let ctx = shared.fresh_clean(pool)?;
                pool.note_fallback();
                ctx
            }
        };
        ctx.transition(ContextState::InUse)?;
        pool.checkout();
        Ok(ContextLease::new(Arc::clone(shared), ctx))
    }

    /// Stop the warmer and release every pooled context. Idempotent.
    ///
    /// Safe while borrows are in flight: leases still out are destroyed when
    /// dropped, and later borrows fall back to synchronous creation.
    pub fn shutdown(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let warmer = self.warmer.lock().take();
        if let Some(mut warmer) = warmer {
            warmer.stop();
        }
        self.shared.drain_jobs();
        let mut released = 0usize;
        for pool in self.shared.pools.values() {
            let clean = pool.drain_clean();
            released += clean.len();
            clean.into_iter().for_each(PooledContext::destroy);
        }
        tracing::debug!(released, "prewarm pool shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.is_closed()
    }

    /// Target Clean population per dictionary.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Number of warmer threads, 0 after shutdown.
    pub fn warmer_workers(&self) -> usize {
        self.warmer.lock().as_ref().map_or(0, Warmer::workers)
    }

    pub fn stats(&self, dict_id: u32) -> Option<PoolStats> {
        self.shared.pools.get(&dict_id).map(ContextPool::stats)
    }

    pub fn dictionary_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.shared.pools.keys().copied()
    }

    pub fn engine(&self) -> &E {
        &self.shared.engine
    }
}

impl<E: FrameEngine> Drop for PrewarmPool<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
