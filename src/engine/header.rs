//! Byte-order helpers and zstd frame/dictionary header inspection.
//!
//! The decoder needs to know which dictionary a frame was encoded against
//! before it can start decoding it, and the dictionary module needs to tell a
//! trained dictionary from raw history bytes. Both only require reading a few
//! fixed header fields, done here without touching the engine.
//!
//! Covers:
//! - LE read helpers (`read_le16`, `read_le32`, `read_le64`)
//! - `parse_frame_header`: frame magic, descriptor flags, dictionary id,
//!   content size; skippable frames are reported with their total length

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Magic numbers
// ─────────────────────────────────────────────────────────────────────────────

/// Magic number opening every zstd frame.
pub const ZSTD_MAGICNUMBER: u32 = 0xFD2F_B528;

/// Magic number opening a trained zstd dictionary.
pub const ZSTD_MAGIC_DICTIONARY: u32 = 0xEC30_A437;

/// Skippable frames use magics `0x184D2A50..=0x184D2A5F`.
pub const ZSTD_MAGIC_SKIPPABLE_START: u32 = 0x184D_2A50;
pub const ZSTD_MAGIC_SKIPPABLE_MASK: u32 = 0xFFFF_FFF0;

/// Magic + dictionary id.
pub const DICT_HEADER_SIZE: usize = 8;

/// Magic + 4-byte length.
pub const SKIPPABLE_HEADER_SIZE: usize = 8;

/// Smallest possible frame header: magic + descriptor byte.
pub const FRAME_HEADER_SIZE_MIN: usize = 5;

// Bytes used by the Dictionary_ID field, indexed by its 2-bit flag.
const DID_FIELD_SIZE: [usize; 4] = [0, 1, 2, 4];
// Bytes used by the Frame_Content_Size field, indexed by its 2-bit flag.
const FCS_FIELD_SIZE: [usize; 4] = [0, 2, 4, 8];

// ─────────────────────────────────────────────────────────────────────────────
// Byte-order I/O helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read a little-endian `u16` from `src` at byte `offset`.
#[inline]
pub fn read_le16(src: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([src[offset], src[offset + 1]])
}

/// Read a little-endian `u32` from `src` at byte `offset`.
///
/// Portable: no alignment or host-endianness assumptions.
#[inline]
pub fn read_le32(src: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        src[offset],
        src[offset + 1],
        src[offset + 2],
        src[offset + 3],
    ])
}

/// Read a little-endian `u64` from `src` at byte `offset`.
#[inline]
pub fn read_le64(src: &[u8], offset: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&src[offset..offset + 8]);
    u64::from_le_bytes(b)
}

// ─────────────────────────────────────────────────────────────────────────────
// Frame header
// ─────────────────────────────────────────────────────────────────────────────

/// Fields of a zstd frame header the pool and decoder care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Dictionary id written by the encoder; `None` when absent or zero.
    pub dict_id: Option<u32>,
    /// Decompressed size when the encoder recorded it.
    pub content_size: Option<u64>,
    /// Whether a 4-byte xxh64-derived checksum trails the last block.
    pub checksum: bool,
    /// Header length in bytes, magic included.
    pub header_size: usize,
}

/// What sits at the start of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Zstd(FrameHeader),
    /// Skippable frame spanning `total_size` bytes, header included.
    Skippable { total_size: usize },
}

/// Inspect the frame starting at `src[0]`.
pub fn parse_frame_header(src: &[u8]) -> Result<FrameKind> {
    if src.len() < 4 {
        return Err(Error::Decode("truncated frame header".to_string()));
    }
    let magic = read_le32(src, 0);
    if magic & ZSTD_MAGIC_SKIPPABLE_MASK == ZSTD_MAGIC_SKIPPABLE_START {
        if src.len() < SKIPPABLE_HEADER_SIZE {
            return Err(Error::Decode("truncated skippable frame".to_string()));
        }
        let total_size = SKIPPABLE_HEADER_SIZE + read_le32(src, 4) as usize;
        if src.len() < total_size {
            return Err(Error::Decode("truncated skippable frame".to_string()));
        }
        return Ok(FrameKind::Skippable { total_size });
    }
    if magic != ZSTD_MAGICNUMBER {
        return Err(Error::Decode(format!("unknown frame magic {magic:#010x}")));
    }
    if src.len() < FRAME_HEADER_SIZE_MIN {
        return Err(Error::Decode("truncated frame header".to_string()));
    }

    let fhd = src[4];
    if fhd & 0x08 != 0 {
        return Err(Error::Decode("reserved frame descriptor bit set".to_string()));
    }
    let did_flag = (fhd & 0x03) as usize;
    let checksum = fhd & 0x04 != 0;
    let single_segment = fhd & 0x20 != 0;
    let fcs_flag = (fhd >> 6) as usize;

    let window_size = usize::from(!single_segment);
    let did_size = DID_FIELD_SIZE[did_flag];
    let fcs_size = if fcs_flag == 0 && single_segment {
        1
    } else {
        FCS_FIELD_SIZE[fcs_flag]
    };
    let header_size = FRAME_HEADER_SIZE_MIN + window_size + did_size + fcs_size;
    if src.len() < header_size {
        return Err(Error::Decode("truncated frame header".to_string()));
    }

    let mut pos = FRAME_HEADER_SIZE_MIN + window_size;
    let dict_id = match did_size {
        0 => 0,
        1 => src[pos] as u32,
        2 => read_le16(src, pos) as u32,
        _ => read_le32(src, pos),
    };
    pos += did_size;
    let content_size = match fcs_size {
        0 => None,
        1 => Some(src[pos] as u64),
        // The 2-byte form is stored with a 256 offset.
        2 => Some(read_le16(src, pos) as u64 + 256),
        4 => Some(read_le32(src, pos) as u64),
        _ => Some(read_le64(src, pos)),
    };

    Ok(FrameKind::Zstd(FrameHeader {
        dict_id: (dict_id != 0).then_some(dict_id),
        content_size,
        checksum,
        header_size,
    }))
}
