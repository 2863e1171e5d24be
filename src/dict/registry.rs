//! Process-local dictionary registry keyed by dictionary id.

use std::collections::BTreeMap;

use crate::dict::dictionary::{DictKind, Dictionary};
use crate::error::{Error, Result};

/// Registered dictionaries, iterated in id order.
///
/// Registration happens while an encoder or decoder is being configured; the
/// registry is then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct DictRegistry {
    dicts: BTreeMap<u32, Dictionary>,
}

impl DictRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `dict`.
    ///
    /// Registering the same dictionary twice is a no-op; registering a
    /// different content under an existing id fails.
    pub fn register(&mut self, dict: Dictionary) -> Result<()> {
        if let Some(existing) = self.dicts.get(&dict.id()) {
            if existing.same_as(&dict) {
                return Ok(());
            }
            return Err(Error::DuplicateDictionary(dict.id()));
        }
        self.dicts.insert(dict.id(), dict);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&Dictionary> {
        self.dicts.get(&id)
    }

    /// Like [`get`](Self::get) but maps a miss to `UnknownDictionary`.
    pub fn require(&self, id: u32) -> Result<&Dictionary> {
        self.get(id).ok_or(Error::UnknownDictionary(id))
    }

    pub fn contains(&self, id: u32) -> bool {
        self.dicts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.dicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dicts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dictionary> {
        self.dicts.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.dicts.keys().copied()
    }

    /// The id of the only raw dictionary, if exactly one is registered.
    pub fn sole_raw(&self) -> Option<u32> {
        let mut raw = self.dicts.values().filter(|d| d.kind() == DictKind::Raw);
        match (raw.next(), raw.next()) {
            (Some(d), None) => Some(d.id()),
            _ => None,
        }
    }
}
