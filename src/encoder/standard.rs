//! Baseline path: bind the dictionary on the calling thread for every call.
//!
//! Contexts are recycled through a small stash so the baseline does not also
//! pay an allocation per call, but every call resets its context before
//! encoding. This is the path prewarming is measured against, and the one
//! used when prewarming is disabled.

use parking_lot::Mutex;

use crate::dict::Dictionary;
use crate::engine::FrameEngine;
use crate::error::Result;

pub(crate) struct StandardPath<C> {
    stash: Mutex<Vec<C>>,
    capacity: usize,
}

impl<C> StandardPath<C> {
    /// Keep at most `capacity` idle contexts between calls.
    pub(crate) fn new(capacity: usize) -> Self {
        StandardPath {
            stash: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Reset a context against `dict`, encode `parts` into `dst`.
    pub(crate) fn encode<E>(
        &self,
        engine: &E,
        dict: Option<&Dictionary>,
        parts: &[&[u8]],
        dst: &mut Vec<u8>,
    ) -> Result<usize>
    where
        E: FrameEngine<Context = C>,
    {
        let recycled = self.stash.lock().pop();
        let mut ctx = match recycled {
            Some(ctx) => ctx,
            None => engine.new_context()?,
        };
        // A context whose reset failed is dropped rather than stashed.
        engine.reset_context(&mut ctx, dict)?;
        let res = engine.encode_frame(&mut ctx, parts, dst);
        self.recycle(ctx);
        res
    }

    fn recycle(&self, ctx: C) {
        let mut stash = self.stash.lock();
        if stash.len() < self.capacity {
            stash.push(ctx);
        }
    }

    /// Release every stashed context.
    pub(crate) fn clear(&self) {
        self.stash.lock().clear();
    }

    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.stash.lock().len()
    }
}
