// config.rs: Compile-time configuration constants.
//
// Runtime configuration lives in `EncoderOptions` / `DecoderOptions` and the
// CLI flags; the values here are the defaults those layers fall back to.

// Default compression level.
// Matches the zstd library default. Can be overridden by the ZPREWARM_CLEVEL
// environment variable at runtime, or by the -l command-line flag.
pub const CLEVEL_DEFAULT: i32 = 3;

// Accepted compression level range (negative levels are zstd "fast" levels).
pub const CLEVEL_MIN: i32 = -7;
pub const CLEVEL_MAX: i32 = 22;

// Environment variable consulted by the CLI for the default level.
pub const CLEVEL_ENV: &str = "ZPREWARM_CLEVEL";

// Default prewarm concurrency. 0 disables prewarming: every call goes
// through the standard (synchronous reset) path.
pub const PREWARM_CONCURRENCY_DEFAULT: usize = 0;

// Hard ceiling on background warmer threads, whatever the target size.
// Reset work beyond the number of cores only oversubscribes the machine.
pub const WARMER_WORKERS_MAX: usize = 16;

// Default cap on the bytes a decoder will produce for one `decode_all` call.
pub const DECODED_SIZE_LIMIT_DEFAULT: usize = 1 << 30;

// Dictionary id the CLI assigns to a raw `-D FILE` dictionary when the file
// is not a trained zstd dictionary and no --dict-id is given.
pub const CLI_DICT_ID_DEFAULT: u32 = 1;

/// Number of warmer threads to run for a given prewarm target.
///
/// One worker per unit of target size is enough since a reset is the
/// dominant cost and cannot be split across threads; the count is bounded by
/// the available cores and [`WARMER_WORKERS_MAX`].
pub fn warmer_workers(target: usize) -> usize {
    let cores = num_cpus::get().max(1);
    target.clamp(1, cores.min(WARMER_WORKERS_MAX))
}

/// Default number of contexts the standard path keeps for reuse.
pub fn standard_concurrency_default() -> usize {
    num_cpus::get().max(1)
}
