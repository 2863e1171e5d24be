//! Binary entry point for the `zprewarm` command-line tool.
//!
//! 1. `clap` parses the command line into a [`Cli`].
//! 2. `-v` / `-q` set the display level; at level 4 a `tracing` subscriber is
//!    installed so the library's pool and warmer events are visible too
//!    (filtered by `RUST_LOG`, default `zprewarm=debug`).
//! 3. [`zprewarm::cli::run`] executes the subcommand; its error, if any, is
//!    printed and turned into exit code 1.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zprewarm::cli::args::Cli;
use zprewarm::cli::constants::{set_display_level, COMPRESSOR_NAME};

const VERBOSE_TRACING_LEVEL: u32 = 4;

fn init_tracing(display_level: u32) {
    if display_level < VERBOSE_TRACING_LEVEL {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("zprewarm=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init();
}

fn run(cli: Cli) -> i32 {
    match zprewarm::cli::run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            if zprewarm::cli::constants::display_level() >= 1 {
                eprintln!("{}: {:#}", COMPRESSOR_NAME, e);
            }
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let level = cli.display_level();
    set_display_level(level);
    init_tracing(level);

    let exit_code = run(cli);
    std::process::exit(exit_code);
}
