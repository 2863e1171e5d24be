//! zstd-backed [`FrameEngine`].
//!
//! Each [`ZstdContext`] owns one `ZSTD_CCtx`. Binding a dictionary resets the
//! context's session and parameters, loads the dictionary, and primes the
//! context by encoding an empty frame into a scratch buffer: zstd digests a
//! loaded dictionary lazily at the start of the first frame, so priming moves
//! that work into the reset where the pool can run it in the background.
//! After priming, a session-only reset keeps the digested tables and the
//! next real frame starts from them directly.

use ::zstd::zstd_safe::{self, CCtx, CParameter, InBuffer, OutBuffer, ResetDirective};

use crate::config::{CLEVEL_DEFAULT, CLEVEL_MAX, CLEVEL_MIN};
use crate::dict::Dictionary;
use crate::engine::FrameEngine;
use crate::error::{Error, Result};

/// Encoder working memory: a zstd compression context plus the id of the
/// dictionary it was last bound to.
pub struct ZstdContext {
    cctx: CCtx<'static>,
    bound: Option<u32>,
    // Receives the priming frame; kept to avoid reallocating on every reset.
    scratch: Vec<u8>,
}

impl ZstdContext {
    /// Dictionary the context was last successfully bound to.
    pub fn bound_dictionary(&self) -> Option<u32> {
        self.bound
    }
}

/// Frame parameters shared by every context the engine creates.
#[derive(Debug, Clone, Copy)]
pub struct ZstdEngine {
    level: i32,
    checksum: bool,
}

impl Default for ZstdEngine {
    fn default() -> Self {
        ZstdEngine {
            level: CLEVEL_DEFAULT,
            checksum: true,
        }
    }
}

impl ZstdEngine {
    pub fn new(level: i32, checksum: bool) -> Result<Self> {
        if !(CLEVEL_MIN..=CLEVEL_MAX).contains(&level) || level == 0 {
            return Err(Error::InvalidOption(format!(
                "compression level {level} outside {CLEVEL_MIN}..={CLEVEL_MAX} (0 excluded)"
            )));
        }
        Ok(ZstdEngine { level, checksum })
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn checksum(&self) -> bool {
        self.checksum
    }

    fn apply_parameters(&self, cctx: &mut CCtx<'static>) -> std::result::Result<(), usize> {
        cctx.set_parameter(CParameter::CompressionLevel(self.level))?;
        cctx.set_parameter(CParameter::ChecksumFlag(self.checksum))?;
        cctx.set_parameter(CParameter::DictIdFlag(true))?;
        Ok(())
    }
}

/// zstd error code → message.
pub(crate) fn error_name(code: usize) -> String {
    zstd_safe::get_error_name(code).to_string()
}

/// Make sure `dst` has at least `additional` bytes of spare capacity.
#[inline]
fn reserve_spare(dst: &mut Vec<u8>, additional: usize) {
    if dst.capacity() - dst.len() < additional {
        dst.reserve(additional);
    }
}

/// Stream `parts` into one frame appended to `dst`.
fn stream_frame(
    cctx: &mut CCtx<'static>,
    parts: &[&[u8]],
    dst: &mut Vec<u8>,
) -> std::result::Result<(), usize> {
    let chunk = CCtx::out_size();
    for part in parts {
        let mut input = InBuffer::around(part);
        while input.pos() < part.len() {
            reserve_spare(dst, chunk);
            let pos = dst.len();
            let mut output = OutBuffer::around_pos(dst, pos);
            cctx.compress_stream(&mut output, &mut input)?;
        }
    }
    loop {
        reserve_spare(dst, chunk);
        let pos = dst.len();
        let mut output = OutBuffer::around_pos(dst, pos);
        if cctx.end_stream(&mut output)? == 0 {
            return Ok(());
        }
    }
}

impl FrameEngine for ZstdEngine {
    type Context = ZstdContext;

    fn new_context(&self) -> Result<ZstdContext> {
        let cctx = CCtx::try_create().ok_or(Error::ContextAllocation)?;
        Ok(ZstdContext {
            cctx,
            bound: None,
            scratch: Vec::new(),
        })
    }

    fn reset_context(&self, ctx: &mut ZstdContext, dict: Option<&Dictionary>) -> Result<()> {
        let id = dict.map(Dictionary::id);
        ctx.bound = None;
        let cctx = &mut ctx.cctx;
        cctx.reset(ResetDirective::SessionAndParameters)
            .map_err(|code| Error::bind(id, error_name(code)))?;
        self.apply_parameters(cctx)
            .map_err(|code| Error::bind(id, error_name(code)))?;
        if let Some(dict) = dict {
            cctx.load_dictionary(dict.content())
                .map_err(|code| Error::bind(id, error_name(code)))?;
            ctx.scratch.clear();
            stream_frame(cctx, &[], &mut ctx.scratch)
                .map_err(|code| Error::bind(id, error_name(code)))?;
            cctx.reset(ResetDirective::SessionOnly)
                .map_err(|code| Error::bind(id, error_name(code)))?;
        }
        ctx.bound = id;
        Ok(())
    }

    fn encode_frame(
        &self,
        ctx: &mut ZstdContext,
        parts: &[&[u8]],
        dst: &mut Vec<u8>,
    ) -> Result<usize> {
        let start = dst.len();
        let total: usize = parts.iter().map(|p| p.len()).sum();
        reserve_spare(dst, zstd_safe::compress_bound(total));
        match stream_frame(&mut ctx.cctx, parts, dst) {
            Ok(()) => Ok(dst.len() - start),
            Err(code) => {
                dst.truncate(start);
                Err(Error::Encode(error_name(code)))
            }
        }
    }

    fn max_encoded_size(&self, src_size: usize) -> usize {
        zstd_safe::compress_bound(src_size)
    }
}
