//! Boundary between the context pool and the compression engine.
//!
//! The pool never looks inside an encoder context: it only creates contexts,
//! asks the engine to bind them to a dictionary, and hands them to the engine
//! to encode a frame. [`FrameEngine`] is that boundary; [`ZstdEngine`] is the
//! production implementation.

pub mod header;
pub mod zstd;

pub use self::zstd::{ZstdContext, ZstdEngine};

use crate::dict::Dictionary;
use crate::error::Result;

/// Primitives the pool needs from a compression engine.
///
/// Implementations must be shareable across request threads and warmer
/// workers; contexts are moved between those threads but never shared.
pub trait FrameEngine: Send + Sync + 'static {
    /// Opaque encoder working memory.
    type Context: Send + 'static;

    /// Allocate a context in the `Uninitialized` state.
    fn new_context(&self) -> Result<Self::Context>;

    /// Bind `ctx` to `dict` (`None` = no dictionary).
    ///
    /// Idempotent and valid whatever the context previously encoded. This is
    /// the expensive call the pool moves off the request path.
    fn reset_context(&self, ctx: &mut Self::Context, dict: Option<&Dictionary>) -> Result<()>;

    /// Encode `parts`, taken in order as one logical input, into a single
    /// frame appended to `dst`. Returns the number of bytes appended.
    ///
    /// On error `dst` is left at its original length. The context may hold
    /// leftover session state either way; a later `reset_context` clears it.
    fn encode_frame(
        &self,
        ctx: &mut Self::Context,
        parts: &[&[u8]],
        dst: &mut Vec<u8>,
    ) -> Result<usize>;

    /// Upper bound on the frame size for `src_size` input bytes.
    fn max_encoded_size(&self, src_size: usize) -> usize;
}
