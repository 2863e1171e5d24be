//! `compress` and `decompress` subcommands.
//!
//! Both read the whole input into memory and emit it in one call: the tool is
//! a front end for the library's one-shot `encode_all` / `decode_all` calls,
//! not a streaming compressor.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{bail, Context};

use crate::cli::args::{CompressArgs, DecompressArgs, DictArgs};
use crate::cli::constants::{display_level, STD_MARK, ZST_EXTENSION};
use crate::config::{CLEVEL_DEFAULT, CLEVEL_ENV, CLI_DICT_ID_DEFAULT};
use crate::decoder::{Decoder, DecoderOptions};
use crate::dict::{DictKind, Dictionary};
use crate::displaylevel;
use crate::encoder::{Encoder, EncoderOptions};

// ── Level from environment ────────────────────────────────────────────────────

/// Default compression level: `ZPREWARM_CLEVEL` if set and numeric, else
/// [`CLEVEL_DEFAULT`].
pub fn init_c_level() -> i32 {
    init_c_level_from(std::env::var(CLEVEL_ENV).ok().as_deref())
}

/// Testable core of [`init_c_level`].
pub fn init_c_level_from(env_val: Option<&str>) -> i32 {
    if let Some(env) = env_val {
        if let Ok(level) = env.trim().parse::<i32>() {
            return level;
        }
        displaylevel!(
            2,
            "Ignore environment variable setting {}={}: not a valid level \n",
            CLEVEL_ENV,
            env
        );
    }
    CLEVEL_DEFAULT
}

// ── Dictionary loading ────────────────────────────────────────────────────────

/// Load the `-D` dictionary, if any.
///
/// With `--dict-id` the file is registered under that id. Without it a
/// trained dictionary keeps its embedded id and raw content gets
/// [`CLI_DICT_ID_DEFAULT`].
pub fn load_dictionary(args: &DictArgs) -> anyhow::Result<Option<Dictionary>> {
    let Some(path) = &args.dict else {
        return Ok(None);
    };
    let content = fs::read(path)
        .with_context(|| format!("cannot read dictionary {}", path.display()))?;
    let dict = match args.dict_id {
        Some(id) => Dictionary::new(id, content)?,
        None => match Dictionary::from_trained(content.clone()) {
            Ok(dict) => dict,
            Err(_) => Dictionary::new(CLI_DICT_ID_DEFAULT, content)?,
        },
    };
    displaylevel!(
        3,
        "Using {} dictionary {} ({} bytes, id {}) \n",
        match dict.kind() {
            DictKind::Raw => "raw",
            DictKind::Trained => "trained",
        },
        path.display(),
        dict.len(),
        dict.id()
    );
    Ok(Some(dict))
}

// ── File helpers ──────────────────────────────────────────────────────────────

fn read_input(input: &str) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if input == STD_MARK {
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("cannot read stdin")?;
    } else {
        buf = fs::read(input).with_context(|| format!("cannot open {input}"))?;
    }
    Ok(buf)
}

fn write_output(output: &str, data: &[u8], force: bool) -> anyhow::Result<()> {
    if output == STD_MARK {
        let mut stdout = io::stdout().lock();
        stdout.write_all(data).context("cannot write stdout")?;
        stdout.flush().context("cannot write stdout")?;
        return Ok(());
    }
    if !force && Path::new(output).exists() {
        bail!("{output} already exists; use -f to overwrite");
    }
    fs::write(output, data).with_context(|| format!("cannot write {output}"))
}

/// Output name for `compress` when none is given.
pub fn compressed_name(input: &str) -> String {
    if input == STD_MARK {
        STD_MARK.to_string()
    } else {
        format!("{input}{ZST_EXTENSION}")
    }
}

/// Output name for `decompress` when none is given.
pub fn decompressed_name(input: &str) -> anyhow::Result<String> {
    if input == STD_MARK {
        return Ok(STD_MARK.to_string());
    }
    match input.strip_suffix(ZST_EXTENSION) {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => bail!("cannot determine an output filename for {input} (no {ZST_EXTENSION} extension)"),
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64 * 100.0
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

pub fn compress(args: &CompressArgs) -> anyhow::Result<()> {
    let level = args.level.unwrap_or_else(init_c_level);
    let mut options = EncoderOptions::new()
        .with_level(level)
        .with_checksum(!args.no_checksum)
        .with_prewarm_concurrency(args.prewarm);
    if let Some(dict) = load_dictionary(&args.dict)? {
        options = options.with_dictionary(dict);
    }
    let encoder = Encoder::new(options)?;

    let src = read_input(&args.input)?;
    let mut dst = Vec::with_capacity(encoder.max_encoded_size(src.len()));
    if encoder.prewarm_enabled() {
        encoder.encode_all_prewarmed(&src, &mut dst)?;
    } else {
        encoder.encode_all(&src, &mut dst)?;
    }
    encoder.shutdown();

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| compressed_name(&args.input));
    write_output(&output, &dst, args.force)?;

    if output != STD_MARK || display_level() >= 3 {
        displaylevel!(
            2,
            "Compressed {} bytes into {} bytes ==> {:.2}% \n",
            src.len(),
            dst.len(),
            ratio(dst.len(), src.len())
        );
    }
    Ok(())
}

pub fn decompress(args: &DecompressArgs) -> anyhow::Result<()> {
    let mut options = DecoderOptions::new();
    if let Some(dict) = load_dictionary(&args.dict)? {
        options = options.with_dictionary(dict);
    }
    let decoder = Decoder::new(options)?;

    let output = match &args.output {
        Some(out) => out.clone(),
        None => decompressed_name(&args.input)?,
    };
    let src = read_input(&args.input)?;
    let dst = decoder.decode_to_vec(&src)?;
    write_output(&output, &dst, args.force)?;

    if output != STD_MARK || display_level() >= 3 {
        displaylevel!(2, "Decoded {} bytes \n", dst.len());
    }
    Ok(())
}
