//! Command-line interface for the `zprewarm` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|---------------|
//! | [`constants`] | Program identity strings, size multipliers and the shared `DISPLAY_LEVEL` atomic. |
//! | [`args`]      | `clap` definitions for the `compress`, `decompress` and `bench` subcommands. |
//! | [`commands`]  | File I/O, dictionary loading and the compress / decompress operations. |
//! | [`bench`]     | Standard vs prewarmed latency grid. |
//!
//! Typical call sequence: `Cli::parse` → [`run`] → subcommand.

pub mod constants;
pub mod args;
pub mod commands;
pub mod bench;

use args::{Cli, Command};
use constants::{display_level, welcome_message};

/// Execute the subcommand selected by `cli`.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    crate::displaylevel!(3, "{}", welcome_message());
    tracing::debug!(display_level = display_level(), "dispatching subcommand");

    match &cli.command {
        Command::Compress(args) => commands::compress(args),
        Command::Decompress(args) => commands::decompress(args),
        Command::Bench(args) => bench::run_bench(args).map(|_| ()),
    }
}
