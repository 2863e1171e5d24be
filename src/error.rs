//! Crate-wide error type.
//!
//! The variants follow the three failure classes of the pool: a dictionary
//! that cannot be bound into a context, an encode that the engine rejects,
//! and a context that cannot be allocated at all. Decoder and configuration
//! errors complete the set.

use thiserror::Error;

use crate::pool::state::ContextState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No dictionary with this id is registered.
    #[error("unknown dictionary id {0}")]
    UnknownDictionary(u32),

    /// Dictionary content or id rejected at construction time.
    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),

    /// A different dictionary is already registered under this id.
    #[error("dictionary id {0} is already registered with different content")]
    DuplicateDictionary(u32),

    /// A reset could not bind the dictionary into a context.
    #[error("cannot bind dictionary {id}: {reason}")]
    DictionaryBind { id: u32, reason: String },

    /// The engine reported an error while encoding a frame.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The engine could not allocate a fresh context.
    #[error("cannot allocate encoder context")]
    ContextAllocation,

    /// Corrupt or unsupported compressed input.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Decoded output would exceed the configured limit.
    #[error("decoded output exceeds limit of {0} bytes")]
    DecodedSizeLimit(usize),

    /// A context was moved along an edge the lifecycle does not allow.
    #[error("illegal context transition {from:?} -> {to:?}")]
    IllegalTransition { from: ContextState, to: ContextState },

    /// Rejected encoder or decoder option.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Bind failure for dictionary `id`; `None` means the "no dictionary" binding.
    pub(crate) fn bind(id: Option<u32>, reason: impl Into<String>) -> Self {
        Error::DictionaryBind {
            id: id.unwrap_or(0),
            reason: reason.into(),
        }
    }
}
