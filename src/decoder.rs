//! Frame decoder used to verify encoder output.
//!
//! The pool itself never decodes; this is the other half of the round trip
//! that tests, the CLI and callers use to check that every path produced a
//! decodable frame. A [`Decoder`] chooses the dictionary per frame from the
//! id in the frame header, so frames encoded against different registered
//! dictionaries can be decoded by the same instance. Frames without an id
//! (no dictionary, or a raw dictionary) use the raw fallback dictionary.

use ::zstd::zstd_safe::{DCtx, InBuffer, OutBuffer, ResetDirective};
use parking_lot::Mutex;

use crate::config::DECODED_SIZE_LIMIT_DEFAULT;
use crate::dict::{DictRegistry, Dictionary};
use crate::engine::header::{parse_frame_header, FrameKind};
use crate::engine::zstd::error_name;
use crate::error::{Error, Result};

/// Builder-style options for [`Decoder`].
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    dictionaries: Vec<Dictionary>,
    raw_fallback: Option<u32>,
    max_decoded_size: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            dictionaries: Vec::new(),
            raw_fallback: None,
            max_decoded_size: DECODED_SIZE_LIMIT_DEFAULT,
        }
    }
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dictionary(mut self, dict: Dictionary) -> Self {
        self.dictionaries.push(dict);
        self
    }

    /// Dictionary for frames that carry no dictionary id. Defaults to the
    /// only raw dictionary registered, if there is exactly one.
    pub fn with_raw_dictionary(mut self, id: u32) -> Self {
        self.raw_fallback = Some(id);
        self
    }

    /// Maximum bytes one `decode_all` call may produce.
    pub fn with_max_decoded_size(mut self, limit: usize) -> Self {
        self.max_decoded_size = limit;
        self
    }
}

pub struct Decoder {
    registry: DictRegistry,
    raw_fallback: Option<u32>,
    max_decoded_size: usize,
    stash: Mutex<Vec<DCtx<'static>>>,
}

impl Decoder {
    pub fn new(options: DecoderOptions) -> Result<Self> {
        let mut registry = DictRegistry::new();
        for dict in options.dictionaries {
            registry.register(dict)?;
        }
        let raw_fallback = match options.raw_fallback {
            Some(id) => Some(registry.require(id)?.id()),
            None => registry.sole_raw(),
        };
        Ok(Decoder {
            registry,
            raw_fallback,
            max_decoded_size: options.max_decoded_size,
            stash: Mutex::new(Vec::new()),
        })
    }

    pub fn registry(&self) -> &DictRegistry {
        &self.registry
    }

    /// Decode every frame in `src`, appending the output to `dst`.
    ///
    /// Skippable frames are ignored. On error `dst` is restored to its
    /// original length.
    pub fn decode_all(&self, src: &[u8], dst: &mut Vec<u8>) -> Result<usize> {
        let start = dst.len();
        let recycled = self.stash.lock().pop();
        let mut dctx = match recycled {
            Some(dctx) => dctx,
            None => DCtx::try_create().ok_or(Error::ContextAllocation)?,
        };
        let res = self.decode_frames(&mut dctx, src, dst, start);
        match res {
            Ok(()) => {
                self.stash.lock().push(dctx);
                Ok(dst.len() - start)
            }
            Err(err) => {
                dst.truncate(start);
                Err(err)
            }
        }
    }

    /// Decode `src` into a fresh buffer.
    pub fn decode_to_vec(&self, src: &[u8]) -> Result<Vec<u8>> {
        let mut dst = Vec::new();
        self.decode_all(src, &mut dst)?;
        Ok(dst)
    }

    fn decode_frames(
        &self,
        dctx: &mut DCtx<'static>,
        src: &[u8],
        dst: &mut Vec<u8>,
        start: usize,
    ) -> Result<()> {
        let mut pos = 0;
        while pos < src.len() {
            let header = match parse_frame_header(&src[pos..])? {
                FrameKind::Skippable { total_size } => {
                    pos += total_size;
                    continue;
                }
                FrameKind::Zstd(header) => header,
            };
            let dict = match header.dict_id {
                Some(id) => Some(self.registry.require(id)?),
                None => self.raw_fallback.and_then(|id| self.registry.get(id)),
            };
            if let Some(size) = header.content_size {
                let limit = self.max_decoded_size - (dst.len() - start);
                if size > limit as u64 {
                    return Err(Error::DecodedSizeLimit(self.max_decoded_size));
                }
            }

            dctx.reset(ResetDirective::SessionAndParameters)
                .map_err(|code| Error::Decode(error_name(code)))?;
            if let Some(dict) = dict {
                dctx.load_dictionary(dict.content())
                    .map_err(|code| Error::bind(Some(dict.id()), error_name(code)))?;
            }
            pos += self.decode_frame(dctx, &src[pos..], dst, start)?;
        }
        Ok(())
    }

    /// Decode the frame at the start of `src`; returns its compressed length.
    fn decode_frame(
        &self,
        dctx: &mut DCtx<'static>,
        src: &[u8],
        dst: &mut Vec<u8>,
        start: usize,
    ) -> Result<usize> {
        let chunk = DCtx::out_size();
        let mut input = InBuffer::around(src);
        loop {
            if dst.capacity() - dst.len() < chunk {
                dst.reserve(chunk);
            }
            let before = dst.len();
            let (hint, written) = {
                let mut output = OutBuffer::around_pos(dst, before);
                let hint = dctx
                    .decompress_stream(&mut output, &mut input)
                    .map_err(|code| Error::Decode(error_name(code)))?;
                (hint, output.pos() - before)
            };

            if dst.len() - start > self.max_decoded_size {
                return Err(Error::DecodedSizeLimit(self.max_decoded_size));
            }
            if hint == 0 {
                return Ok(input.pos());
            }
            if written == 0 && input.pos() == src.len() {
                return Err(Error::Decode("truncated frame".to_string()));
            }
        }
    }
}
