//! Encoder configuration.

use crate::config::{
    standard_concurrency_default, CLEVEL_DEFAULT, PREWARM_CONCURRENCY_DEFAULT,
};
use crate::dict::Dictionary;

/// Builder-style options for [`Encoder`](crate::encoder::Encoder).
///
/// ```
/// use zprewarm::{Dictionary, EncoderOptions};
///
/// let dict = Dictionary::new(1, b"shared history".to_vec()).unwrap();
/// let opts = EncoderOptions::new()
///     .with_level(1)
///     .with_prewarm_concurrency(4)
///     .with_dictionary(dict);
/// assert_eq!(opts.prewarm_concurrency(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    pub(crate) level: i32,
    pub(crate) checksum: bool,
    pub(crate) concurrency: usize,
    pub(crate) prewarm_concurrency: usize,
    pub(crate) dictionaries: Vec<Dictionary>,
    pub(crate) default_dictionary: Option<u32>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            level: CLEVEL_DEFAULT,
            checksum: true,
            concurrency: standard_concurrency_default(),
            prewarm_concurrency: PREWARM_CONCURRENCY_DEFAULT,
            dictionaries: Vec::new(),
            default_dictionary: None,
        }
    }
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// zstd compression level.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Append a content checksum to every frame.
    pub fn with_checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum;
        self
    }

    /// Idle contexts the standard path keeps for reuse.
    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    /// Target Clean contexts per dictionary; 0 disables prewarming.
    pub fn with_prewarm_concurrency(mut self, n: usize) -> Self {
        self.prewarm_concurrency = n;
        self
    }

    /// Register a dictionary. The first one registered becomes the default
    /// unless [`with_default_dictionary`](Self::with_default_dictionary) says
    /// otherwise.
    pub fn with_dictionary(mut self, dict: Dictionary) -> Self {
        self.dictionaries.push(dict);
        self
    }

    /// Dictionary used by the calls that do not name one.
    pub fn with_default_dictionary(mut self, id: u32) -> Self {
        self.default_dictionary = Some(id);
        self
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn checksum(&self) -> bool {
        self.checksum
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn prewarm_concurrency(&self) -> usize {
        self.prewarm_concurrency
    }

    pub fn dictionaries(&self) -> &[Dictionary] {
        &self.dictionaries
    }
}
