//! Dictionaries and the id-keyed registry the encoder and decoder share.

pub mod dictionary;
pub mod registry;

pub use dictionary::{DictKind, Dictionary};
pub use registry::DictRegistry;
