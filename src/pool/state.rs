//! Lifecycle of a pooled encoder context.
//!
//! ```text
//! Uninitialized ──reset──▶ Clean ──borrow──▶ InUse ──return──▶ Dirty
//!                            ▲                                   │
//!                            └───────────── warmer reset ────────┘
//! any state ──teardown / failed reset──▶ Destroyed
//! ```
//!
//! Every move goes through [`PooledContext::transition`], which rejects
//! edges outside this graph.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextState {
    /// Allocated, never bound to a dictionary.
    Uninitialized,
    /// Bound and idle; ready for immediate use.
    Clean,
    /// Owned by exactly one caller for one encode.
    InUse,
    /// Used; waiting for (or undergoing) a reset.
    Dirty,
    /// Released; never used again.
    Destroyed,
}

impl ContextState {
    /// Whether the lifecycle allows moving from `self` to `to`.
    pub fn can_transition(self, to: ContextState) -> bool {
        use ContextState::*;
        matches!(
            (self, to),
            (Uninitialized, Clean)
                | (Clean, InUse)
                | (InUse, Dirty)
                | (Dirty, Clean)
                | (Uninitialized | Clean | InUse | Dirty, Destroyed)
        )
    }
}

/// An engine context together with its lifecycle bookkeeping.
pub struct PooledContext<C> {
    inner: C,
    state: ContextState,
    dict_id: u32,
    uses: u64,
}

impl<C> PooledContext<C> {
    /// Wrap a freshly allocated context destined for dictionary `dict_id`.
    pub fn new(inner: C, dict_id: u32) -> Self {
        PooledContext {
            inner,
            state: ContextState::Uninitialized,
            dict_id,
            uses: 0,
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Dictionary this context is (or will be) bound to.
    pub fn dict_id(&self) -> u32 {
        self.dict_id
    }

    /// Number of times the context has been borrowed.
    pub fn uses(&self) -> u64 {
        self.uses
    }

    pub fn transition(&mut self, to: ContextState) -> Result<()> {
        if !self.state.can_transition(to) {
            return Err(Error::IllegalTransition {
                from: self.state,
                to,
            });
        }
        if to == ContextState::InUse {
            self.uses += 1;
        }
        self.state = to;
        Ok(())
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Mark the context destroyed and drop it.
    pub fn destroy(mut self) {
        self.state = ContextState::Destroyed;
    }
}
