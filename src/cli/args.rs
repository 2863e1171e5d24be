//! Command-line argument definitions for the `zprewarm` tool.
//!
//! Parsing is done with `clap`'s derive API. [`Cli::parse_from`] is usable
//! from unit tests without touching `std::env`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::constants::level_from_flags;

#[derive(Debug, Parser)]
#[command(
    name = "zprewarm",
    version,
    about = "zstd compression with a prewarmed dictionary-context pool"
)]
pub struct Cli {
    /// Increase verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Display level implied by `-v` / `-q`.
    pub fn display_level(&self) -> u32 {
        level_from_flags(self.verbose, self.quiet)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compress INPUT into one zstd frame
    Compress(CompressArgs),
    /// Decompress every frame of INPUT
    Decompress(DecompressArgs),
    /// Compare standard and prewarmed per-call latency
    Bench(BenchArgs),
}

/// Dictionary selection shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct DictArgs {
    /// Dictionary file (trained zstd dictionary or raw content)
    #[arg(short = 'D', long = "dict", value_name = "FILE")]
    pub dict: Option<PathBuf>,

    /// Dictionary id (default: the embedded id of a trained dictionary, else 1); must match a trained dictionary's embedded id
    #[arg(long = "dict-id", value_name = "N", requires = "dict")]
    pub dict_id: Option<u32>,
}

#[derive(Debug, Args)]
pub struct CompressArgs {
    #[command(flatten)]
    pub dict: DictArgs,

    /// Compression level (default: $ZPREWARM_CLEVEL or 3)
    #[arg(short, long, allow_negative_numbers = true)]
    pub level: Option<i32>,

    /// Prewarmed contexts to keep per dictionary (0 = bind on the calling thread)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub prewarm: usize,

    /// Do not append a content checksum
    #[arg(long)]
    pub no_checksum: bool,

    /// Overwrite OUTPUT if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Input file, or `-` for stdin
    pub input: String,

    /// Output file, or `-` for stdout (default: INPUT.zst)
    pub output: Option<String>,
}

#[derive(Debug, Args)]
pub struct DecompressArgs {
    #[command(flatten)]
    pub dict: DictArgs,

    /// Overwrite OUTPUT if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Input file, or `-` for stdin
    pub input: String,

    /// Output file, or `-` for stdout (default: INPUT without .zst)
    pub output: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct BenchArgs {
    #[command(flatten)]
    pub dict: DictArgs,

    /// Bytes per encode call
    #[arg(long, value_name = "BYTES", default_value_t = 1024)]
    pub size: usize,

    /// Encode calls per caller thread
    #[arg(long, value_name = "N", default_value_t = 2000)]
    pub iterations: usize,

    /// Caller thread counts to measure
    #[arg(long, value_name = "LIST", value_delimiter = ',', default_values_t = [1usize, 2, 4, 8])]
    pub threads: Vec<usize>,

    /// Prewarm concurrencies to measure
    #[arg(long, value_name = "LIST", value_delimiter = ',', default_values_t = [1usize, 2, 4, 8])]
    pub prewarm: Vec<usize>,

    /// Compression level
    #[arg(short, long, allow_negative_numbers = true, default_value_t = 1)]
    pub level: i32,
}
