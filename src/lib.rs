// zprewarm: prewarmed zstd encoder-context pool

pub mod config;
pub mod error;
pub mod dict;
pub mod engine;
pub mod pool;
pub mod encoder;
pub mod decoder;
pub mod sample;
pub mod cli;

// ── Version constants ────────────────────────────────────────────────────────
pub const ZPREWARM_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version string.
pub fn version_string() -> &'static str {
    ZPREWARM_VERSION_STRING
}

/// Returns the version number of the linked zstd library
/// (`major * 10000 + minor * 100 + release`).
pub fn zstd_version_number() -> u32 {
    ::zstd::zstd_safe::version_number()
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use decoder::{Decoder, DecoderOptions};
pub use dict::{DictKind, DictRegistry, Dictionary};
pub use encoder::{Encoder, EncoderOptions};
pub use engine::{FrameEngine, ZstdContext, ZstdEngine};
pub use error::{Error, Result};
pub use pool::{ContextLease, ContextState, PoolStats, PrewarmPool};
