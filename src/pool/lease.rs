//! RAII hand-off of a borrowed context.

use std::sync::Arc;

use crate::engine::FrameEngine;
use crate::pool::state::{ContextState, PooledContext};
use crate::pool::Shared;

/// Exclusive ownership of one InUse context.
///
/// Dropping the lease performs `Return`: the context is marked Dirty and
/// queued for the warmer (or destroyed once the pool is shut down). Because
/// this happens in `Drop`, an encode that fails, panics, or is abandoned
/// part-way still hands its context back.
pub struct ContextLease<E: FrameEngine> {
    shared: Arc<Shared<E>>,
    ctx: Option<PooledContext<E::Context>>,
}

impl<E: FrameEngine> ContextLease<E> {
    pub(crate) fn new(shared: Arc<Shared<E>>, ctx: PooledContext<E::Context>) -> Self {
        ContextLease {
            shared,
            ctx: Some(ctx),
        }
    }

    /// Engine context, bound to [`dict_id`](Self::dict_id).
    pub fn context_mut(&mut self) -> &mut E::Context {
        // `ctx` is only taken in `drop`.
        self.ctx
            .as_mut()
            .map(PooledContext::inner_mut)
            .unwrap_or_else(|| unreachable!("lease used after return"))
    }

    pub fn dict_id(&self) -> u32 {
        self.ctx.as_ref().map_or(0, PooledContext::dict_id)
    }

    pub fn state(&self) -> ContextState {
        self.ctx
            .as_ref()
            .map_or(ContextState::Destroyed, PooledContext::state)
    }

    /// How many times the leased context has been borrowed, this time included.
    pub fn uses(&self) -> u64 {
        self.ctx.as_ref().map_or(0, PooledContext::uses)
    }
}

impl<E: FrameEngine> Drop for ContextLease<E> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.shared.give_back(ctx);
        }
    }
}
