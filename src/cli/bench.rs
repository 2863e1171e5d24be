//! `bench` subcommand: standard vs prewarmed per-call latency.
//!
//! For every caller-thread count in `--threads`, the standard facade is
//! measured once, then the prewarmed facade once per value in `--prewarm`.
//! Callers run on a dedicated rayon pool (`broadcast`, one loop per thread);
//! each encodes the same `--size` byte input `--iterations` times into a
//! reused buffer, so the dictionary bind is the only thing that differs
//! between the two facades. One call per configuration is made before timing
//! so construction and first warm-up are excluded, and the last frame of
//! every caller is decoded and compared.

use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use rayon::ThreadPoolBuilder;

use crate::cli::args::BenchArgs;
use crate::cli::commands::load_dictionary;
use crate::cli::constants::MB;
use crate::decoder::{Decoder, DecoderOptions};
use crate::dict::Dictionary;
use crate::encoder::{Encoder, EncoderOptions};
use crate::sample::{gen_pattern, gen_repeat, SampleRng};
use crate::{displaylevel, displayout};

/// Default dictionary size, history and trained alike.
const BENCH_DICT_SIZE: usize = 40 << 10;
/// Samples fed to the trainer for the default dictionary.
const BENCH_NB_SAMPLES: usize = 256;

/// Facade measured by one [`BenchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchMode {
    Standard,
    Prewarmed { prewarm: usize },
}

#[derive(Debug, Clone)]
pub struct BenchResult {
    pub mode: BenchMode,
    pub threads: usize,
    pub calls: usize,
    pub elapsed: Duration,
    /// Wall time per call as seen by one caller.
    pub ns_per_op: f64,
    /// Aggregate input throughput across all callers.
    pub mb_per_s: f64,
}

impl BenchResult {
    fn label(&self) -> String {
        match self.mode {
            BenchMode::Standard => format!("encode_all/threads={}", self.threads),
            BenchMode::Prewarmed { prewarm } => format!(
                "encode_all_prewarmed/threads={}/prewarm={}",
                self.threads, prewarm
            ),
        }
    }
}

/// Dictionary used when no `-D` is given: trained on synthetic records, or
/// raw synthetic history if training fails.
pub fn default_bench_dictionary() -> anyhow::Result<Dictionary> {
    let mut rng = SampleRng::new(1);
    let samples: Vec<Vec<u8>> = (0..BENCH_NB_SAMPLES)
        .map(|_| gen_pattern(&mut rng, 1024))
        .collect();
    match ::zstd::dict::from_samples(&samples, BENCH_DICT_SIZE) {
        Ok(trained) => Ok(Dictionary::from_trained(trained)?),
        Err(err) => {
            displaylevel!(3, "dictionary training failed ({err}); using raw history \n");
            Ok(Dictionary::new(1, gen_repeat(BENCH_DICT_SIZE))?)
        }
    }
}

fn check_args(args: &BenchArgs) -> anyhow::Result<()> {
    if args.iterations == 0 {
        bail!("--iterations must be at least 1");
    }
    if args.threads.iter().any(|&t| t == 0) {
        bail!("--threads values must be at least 1");
    }
    if args.prewarm.iter().any(|&p| p == 0) {
        bail!("--prewarm values must be at least 1");
    }
    Ok(())
}

/// Run the whole grid and print one line per configuration.
pub fn run_bench(args: &BenchArgs) -> anyhow::Result<Vec<BenchResult>> {
    check_args(args)?;
    let dict = match load_dictionary(&args.dict)? {
        Some(dict) => dict,
        None => default_bench_dictionary()?,
    };
    let src = gen_pattern(&mut SampleRng::new(2), args.size);
    let decoder = Decoder::new(DecoderOptions::new().with_dictionary(dict.clone()))?;

    displaylevel!(
        2,
        "bench: {} byte input, dictionary id {} ({} bytes), {} calls per caller \n",
        src.len(),
        dict.id(),
        dict.len(),
        args.iterations
    );

    let mut results = Vec::new();
    for &threads in &args.threads {
        let callers = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("zprewarm-bench-{i}"))
            .build()
            .context("cannot build caller pool")?;

        let modes = std::iter::once(BenchMode::Standard)
            .chain(args.prewarm.iter().map(|&p| BenchMode::Prewarmed { prewarm: p }));
        for mode in modes {
            let prewarm = match mode {
                BenchMode::Standard => 0,
                BenchMode::Prewarmed { prewarm } => prewarm,
            };
            let encoder = Encoder::new(
                EncoderOptions::new()
                    .with_level(args.level)
                    .with_checksum(false)
                    .with_concurrency(threads)
                    .with_prewarm_concurrency(prewarm)
                    .with_dictionary(dict.clone()),
            )?;
            let encode = |dst: &mut Vec<u8>| match mode {
                BenchMode::Standard => encoder.encode_all(&src, dst),
                BenchMode::Prewarmed { .. } => encoder.encode_all_prewarmed(&src, dst),
            };

            let mut warm = Vec::with_capacity(encoder.max_encoded_size(src.len()));
            encode(&mut warm)?;

            let start = Instant::now();
            let frames = callers.broadcast(|_| {
                let mut dst = Vec::with_capacity(encoder.max_encoded_size(src.len()));
                for _ in 0..args.iterations {
                    dst.clear();
                    encode(&mut dst)?;
                }
                Ok::<_, crate::Error>(dst)
            });
            let elapsed = start.elapsed();
            encoder.shutdown();

            for frame in frames {
                let decoded = decoder.decode_to_vec(&frame?)?;
                if decoded != src {
                    bail!("round-trip mismatch in {:?} with {} threads", mode, threads);
                }
            }

            let calls = threads * args.iterations;
            let secs = elapsed.as_secs_f64().max(f64::MIN_POSITIVE);
            let result = BenchResult {
                mode,
                threads,
                calls,
                elapsed,
                ns_per_op: elapsed.as_nanos() as f64 / args.iterations as f64,
                mb_per_s: (calls * src.len()) as f64 / MB as f64 / secs,
            };
            displayout!(
                "{:<46} {:>12.0} ns/op {:>10.1} MB/s\n",
                result.label(),
                result.ns_per_op,
                result.mb_per_s
            );
            results.push(result);
        }
    }
    Ok(results)
}
