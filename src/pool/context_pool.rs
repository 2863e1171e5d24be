//! Per-dictionary set of Clean contexts plus its counters.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::dict::Dictionary;
use crate::pool::state::PooledContext;

/// Point-in-time view of one dictionary's pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Clean population the pool converges to.
    pub target: usize,
    /// Contexts bound and idle right now.
    pub clean: usize,
    /// Contexts InUse or Dirty (borrowed, or waiting for the warmer).
    pub outstanding: usize,
    /// Warm-up jobs queued but not finished.
    pub warming: usize,
    /// Contexts ever allocated for this dictionary.
    pub created: usize,
    /// Borrows served from the Clean set.
    pub hits: usize,
    /// Borrows served by synchronous creation.
    pub fallbacks: usize,
    /// Resets that failed; the context was discarded.
    pub reset_failures: usize,
    /// Clean contexts dropped to bring the set back to target.
    pub retired: usize,
    /// Contexts destroyed on return after shutdown.
    pub discarded: usize,
}

/// Clean set and counters for the contexts bound to one dictionary.
pub(crate) struct ContextPool<C> {
    dict: Dictionary,
    target: usize,
    clean: Mutex<Vec<PooledContext<C>>>,
    outstanding: AtomicUsize,
    warming: AtomicUsize,
    created: AtomicUsize,
    hits: AtomicUsize,
    fallbacks: AtomicUsize,
    reset_failures: AtomicUsize,
    retired: AtomicUsize,
    discarded: AtomicUsize,
}

impl<C> ContextPool<C> {
    pub(crate) fn new(dict: Dictionary, target: usize) -> Self {
        ContextPool {
            dict,
            target,
            clean: Mutex::new(Vec::with_capacity(target)),
            outstanding: AtomicUsize::new(0),
            warming: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
            reset_failures: AtomicUsize::new(0),
            retired: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    pub(crate) fn dict(&self) -> &Dictionary {
        &self.dict
    }

    pub(crate) fn target(&self) -> usize {
        self.target
    }

    /// Take any Clean context. Never waits on the warmer.
    pub(crate) fn take_clean(&self) -> Option<PooledContext<C>> {
        let ctx = self.clean.lock().pop();
        if ctx.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        ctx
    }

    /// Deposit a Clean context; the set may exceed target until trimmed.
    pub(crate) fn put_clean(&self, ctx: PooledContext<C>) {
        self.clean.lock().push(ctx);
    }

    /// Remove Clean contexts beyond target. Returns the surplus so the
    /// caller can destroy it outside the lock.
    pub(crate) fn take_surplus(&self) -> Vec<PooledContext<C>> {
        let mut clean = self.clean.lock();
        if clean.len() <= self.target {
            return Vec::new();
        }
        let surplus = clean.split_off(self.target);
        self.retired.fetch_add(surplus.len(), Ordering::Relaxed);
        surplus
    }

    /// Remove every Clean context (teardown).
    pub(crate) fn drain_clean(&self) -> Vec<PooledContext<C>> {
        std::mem::take(&mut *self.clean.lock())
    }

    pub(crate) fn clean_len(&self) -> usize {
        self.clean.lock().len()
    }

    pub(crate) fn note_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn note_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn note_reset_failure(&self) {
        self.reset_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn note_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// A context left the Clean set (or was created) for a caller.
    pub(crate) fn checkout(&self) {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    /// An outstanding context came back Clean or was destroyed.
    pub(crate) fn checkin(&self) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn warming_started(&self, n: usize) {
        self.warming.fetch_add(n, Ordering::AcqRel);
    }

    pub(crate) fn warming_finished(&self) {
        self.warming.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            target: self.target(),
            clean: self.clean_len(),
            outstanding: self.outstanding.load(Ordering::Acquire),
            warming: self.warming.load(Ordering::Acquire),
            created: self.created.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            reset_failures: self.reset_failures.load(Ordering::Relaxed),
            retired: self.retired.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}
