// cli/constants.rs: program identity, size multipliers, display level.

use std::sync::atomic::{AtomicU32, Ordering};

// ── String / identity constants ───────────────────────────────────────────────
pub const COMPRESSOR_NAME: &str = "zprewarm";
pub const ZST_EXTENSION: &str = ".zst";

/// Marker accepted in place of a path for stdin / stdout.
pub const STD_MARK: &str = "-";

/// Banner printed at display level 3 and above.
pub fn welcome_message() -> String {
    format!(
        "*** {} v{} {}-bit, zstd {} ***\n",
        COMPRESSOR_NAME,
        crate::version_string(),
        std::mem::size_of::<*const ()>() * 8,
        crate::zstd_version_number()
    )
}

// ── Size multiplier constants ─────────────────────────────────────────────────
pub const KB: u64 = 1 << 10;
pub const MB: u64 = 1 << 20;

// ── Display level global ──────────────────────────────────────────────────────
//
// 0 = no output; 1 = errors only; 2 = normal (downgradable); 3 = non-downgradable;
// 4 = verbose (also installs the tracing subscriber)
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Level implied by the count of `-v` and `-q` flags, starting from 2.
pub fn level_from_flags(verbose: u8, quiet: u8) -> u32 {
    (2 + verbose as i32 - quiet as i32).clamp(0, 4) as u32
}

// ── Display helpers ───────────────────────────────────────────────────────────
//
//   displayout!(...)      → stdout
//   display!(...)         → stderr
//   displaylevel!(l, ...) → stderr when display_level() >= l

/// Print to stdout.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => { print!($($arg)*) };
}

/// Print to stderr.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Conditionally print to stderr at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
