//! Immutable dictionaries shared read-only by every context bound to them.
//!
//! A [`Dictionary`] is either raw history bytes or a trained zstd dictionary
//! (magic-prefixed, carrying its own id). Content is held in an `Arc<[u8]>`,
//! so cloning a `Dictionary` never copies the bytes.

use std::fmt;
use std::sync::Arc;

use xxhash_rust::xxh64::xxh64;

use crate::engine::header::{read_le32, DICT_HEADER_SIZE, ZSTD_MAGIC_DICTIONARY};
use crate::error::{Error, Result};

/// Seed for the content fingerprint.
const FINGERPRINT_SEED: u64 = 0;

/// How the dictionary content is interpreted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictKind {
    /// Plain history bytes; frames encoded with it carry no dictionary id.
    Raw,
    /// A trained zstd dictionary with entropy tables and an embedded id.
    Trained,
}

/// Identifier + immutable content used to seed an encoder's history and
/// entropy state.
#[derive(Clone)]
pub struct Dictionary {
    id: u32,
    kind: DictKind,
    fingerprint: u64,
    content: Arc<[u8]>,
}

impl Dictionary {
    /// Build a dictionary from caller-assigned `id` and `content`.
    ///
    /// `id` must be non-zero: zero is the wire value for "no dictionary".
    /// When `content` is a trained dictionary its embedded id must equal `id`.
    pub fn new(id: u32, content: impl Into<Arc<[u8]>>) -> Result<Self> {
        if id == 0 {
            return Err(Error::InvalidDictionary(
                "dictionary id 0 is reserved".to_string(),
            ));
        }
        let content: Arc<[u8]> = content.into();
        let kind = match trained_dict_id(&content) {
            Some(embedded) if embedded != id => {
                return Err(Error::InvalidDictionary(format!(
                    "trained dictionary carries id {embedded}, registered as {id}"
                )));
            }
            Some(_) => DictKind::Trained,
            None => DictKind::Raw,
        };
        let fingerprint = xxh64(&content, FINGERPRINT_SEED);
        Ok(Dictionary {
            id,
            kind,
            fingerprint,
            content,
        })
    }

    /// Build a dictionary from a trained zstd dictionary, using its embedded id.
    pub fn from_trained(content: impl Into<Arc<[u8]>>) -> Result<Self> {
        let content: Arc<[u8]> = content.into();
        match trained_dict_id(&content) {
            Some(0) => Err(Error::InvalidDictionary(
                "trained dictionary carries reserved id 0".to_string(),
            )),
            Some(id) => Dictionary::new(id, content),
            None => Err(Error::InvalidDictionary(
                "content is not a trained zstd dictionary".to_string(),
            )),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> DictKind {
        self.kind
    }

    /// xxh64 of the content, computed once at construction.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True when both dictionaries have the same id and content.
    pub fn same_as(&self, other: &Dictionary) -> bool {
        self.id == other.id
            && self.fingerprint == other.fingerprint
            && self.content[..] == other.content[..]
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("len", &self.content.len())
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint))
            .finish()
    }
}

/// Embedded id of a trained dictionary, or `None` for raw content.
fn trained_dict_id(content: &[u8]) -> Option<u32> {
    if content.len() < DICT_HEADER_SIZE || read_le32(content, 0) != ZSTD_MAGIC_DICTIONARY {
        return None;
    }
    Some(read_le32(content, 4))
}
