//! Public encode entry points.
//!
//! [`Encoder`] offers two facades over the same engine and dictionaries:
//!
//! - the **standard** facade ([`Encoder::encode_all`],
//!   [`Encoder::encode_all_parts`]) binds the dictionary on the calling
//!   thread for every call;
//! - the **prewarmed** facade ([`Encoder::encode_all_prewarmed`],
//!   [`Encoder::encode_all_parts_prewarmed`],
//!   [`Encoder::encode_prewarmed_with`]) borrows an already-bound context
//!   from the [`PrewarmPool`] and hands it back Dirty when done.
//!
//! Both produce self-contained frames that decode to the same bytes; they
//! differ only in latency and allocation pattern. With prewarm concurrency 0,
//! or when no dictionary is configured, the prewarmed calls route through the
//! standard facade.
//!
//! All calls append to a caller-supplied `dst` so a buffer can be reused
//! across calls, and return the number of bytes appended.

pub mod options;
pub(crate) mod standard;

pub use options::EncoderOptions;

use std::sync::Arc;

use rayon::prelude::*;

use crate::dict::{DictRegistry, Dictionary};
use crate::engine::{FrameEngine, ZstdEngine};
use crate::error::Result;
use crate::pool::{PoolStats, PrewarmPool};
use standard::StandardPath;

pub struct Encoder<E: FrameEngine = ZstdEngine> {
    engine: Arc<E>,
    registry: DictRegistry,
    default_dictionary: Option<u32>,
    standard: StandardPath<E::Context>,
    prewarm: Option<PrewarmPool<E>>,
}

impl Encoder<ZstdEngine> {
    /// zstd encoder configured from `options`.
    pub fn new(options: EncoderOptions) -> Result<Self> {
        let engine = ZstdEngine::new(options.level, options.checksum)?;
        Self::with_engine(engine, options)
    }
}

impl<E: FrameEngine> Encoder<E> {
    /// Encoder over any [`FrameEngine`]. Level and checksum options are the
    /// engine's business and are ignored here.
    pub fn with_engine(engine: E, options: EncoderOptions) -> Result<Self> {
        let first_registered = options.dictionaries.first().map(Dictionary::id);
        let mut registry = DictRegistry::new();
        for dict in options.dictionaries {
            registry.register(dict)?;
        }
        let default_dictionary = match options.default_dictionary {
            Some(id) => Some(registry.require(id)?.id()),
            None => first_registered,
        };

        let engine = Arc::new(engine);
        let prewarm = if options.prewarm_concurrency > 0 && !registry.is_empty() {
            Some(PrewarmPool::new(
                Arc::clone(&engine),
                &registry,
                options.prewarm_concurrency,
            )?)
        } else {
            None
        };

        Ok(Encoder {
            engine,
            registry,
            default_dictionary,
            standard: StandardPath::new(options.concurrency.max(1)),
            prewarm,
        })
    }

    fn default_dict(&self) -> Option<&Dictionary> {
        self.default_dictionary.and_then(|id| self.registry.get(id))
    }

    // ── Standard facade ─────────────────────────────────────────────────────

    /// Encode `src` as one frame against the default dictionary, binding it
    /// synchronously.
    pub fn encode_all(&self, src: &[u8], dst: &mut Vec<u8>) -> Result<usize> {
        self.encode_all_parts(&[src], dst)
    }

    /// Encode `parts` as one logical input (one frame) against the default
    /// dictionary, binding it synchronously.
    pub fn encode_all_parts(&self, parts: &[&[u8]], dst: &mut Vec<u8>) -> Result<usize> {
        self.standard
            .encode(&*self.engine, self.default_dict(), parts, dst)
    }

    /// Standard facade against dictionary `dict_id`.
    pub fn encode_standard_with(
        &self,
        dict_id: u32,
        parts: &[&[u8]],
        dst: &mut Vec<u8>,
    ) -> Result<usize> {
        let dict = self.registry.require(dict_id)?;
        self.standard.encode(&*self.engine, Some(dict), parts, dst)
    }

    // ── Prewarmed facade ────────────────────────────────────────────────────

    /// Encode `src` with a prewarmed context bound to the default dictionary.
    pub fn encode_all_prewarmed(&self, src: &[u8], dst: &mut Vec<u8>) -> Result<usize> {
        self.encode_all_parts_prewarmed(&[src], dst)
    }

    /// Encode `parts` as one frame with a prewarmed context bound to the
    /// default dictionary.
    pub fn encode_all_parts_prewarmed(
        &self,
        parts: &[&[u8]],
        dst: &mut Vec<u8>,
    ) -> Result<usize> {
        match self.default_dictionary {
            Some(id) => self.encode_prewarmed_with(id, parts, dst),
            None => self.encode_all_parts(parts, dst),
        }
    }

    /// Encode `parts` as one frame with a prewarmed context bound to
    /// dictionary `dict_id`.
    ///
    /// The borrowed context goes back to the pool when this returns, whether
    /// the encode succeeded or not; engine errors are passed through as is.
    pub fn encode_prewarmed_with(
        &self,
        dict_id: u32,
        parts: &[&[u8]],
        dst: &mut Vec<u8>,
    ) -> Result<usize> {
        let Some(pool) = &self.prewarm else {
            return self.encode_standard_with(dict_id, parts, dst);
        };
        let mut lease = pool.borrow(dict_id)?;
        self.engine.encode_frame(lease.context_mut(), parts, dst)
    }

    /// Encode each input as its own frame, in parallel on the rayon global
    /// pool, through the prewarmed facade. Output order matches input order.
    pub fn encode_batch_prewarmed(&self, inputs: &[&[u8]]) -> Result<Vec<Vec<u8>>> {
        inputs
            .par_iter()
            .map(|src| {
                let mut dst = Vec::with_capacity(self.max_encoded_size(src.len()));
                self.encode_all_prewarmed(src, &mut dst)?;
                Ok(dst)
            })
            .collect()
    }

    // ── Introspection / lifecycle ───────────────────────────────────────────

    pub fn max_encoded_size(&self, src_size: usize) -> usize {
        self.engine.max_encoded_size(src_size)
    }

    pub fn prewarm_enabled(&self) -> bool {
        self.prewarm.as_ref().is_some_and(|p| !p.is_shut_down())
    }

    pub fn pool_stats(&self, dict_id: u32) -> Option<PoolStats> {
        self.prewarm.as_ref().and_then(|p| p.stats(dict_id))
    }

    pub fn default_dictionary(&self) -> Option<u32> {
        self.default_dictionary
    }

    pub fn registry(&self) -> &DictRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Stop background workers and release pooled context memory.
    ///
    /// Idempotent. Encoding keeps working afterwards; prewarmed calls fall
    /// back to binding on the calling thread.
    pub fn shutdown(&self) {
        if let Some(pool) = &self.prewarm {
            pool.shutdown();
        }
        self.standard.clear();
    }
}
