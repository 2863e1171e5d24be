// e2e/cli_integration.rs: black-box tests of the `zprewarm` binary
//
// Runs the binary through std::process::Command in a temp directory and
// checks exit codes, output files, and round trips with and without
// dictionaries.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;
use zprewarm::sample::{gen_pattern, gen_repeat, SampleRng};

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_zprewarm"))
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run zprewarm")
}

/// TempDir with `input.txt` (~32 KiB of records) and `dict.bin` (raw history).
fn workspace() -> (TempDir, Vec<u8>) {
    let dir = TempDir::new().unwrap();
    let content = gen_pattern(&mut SampleRng::new(1), 32 << 10);
    fs::write(dir.path().join("input.txt"), &content).unwrap();
    fs::write(dir.path().join("dict.bin"), gen_repeat(8 << 10)).unwrap();
    (dir, content)
}

// ── 1. Round trips ───────────────────────────────────────────────────────────

#[test]
fn compress_decompress_default_names() {
    let (dir, content) = workspace();
    let out = run(dir.path(), &["compress", "input.txt"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.path().join("input.txt.zst").exists());

    fs::remove_file(dir.path().join("input.txt")).unwrap();
    let out = run(dir.path(), &["decompress", "input.txt.zst"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(dir.path().join("input.txt")).unwrap(), content);
}

#[test]
fn prewarmed_dictionary_round_trip() {
    let (dir, content) = workspace();
    let out = run(
        dir.path(),
        &["compress", "-D", "dict.bin", "--prewarm", "2", "-l", "5", "input.txt", "c.zst"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = run(dir.path(), &["decompress", "-D", "dict.bin", "c.zst", "back.txt"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(dir.path().join("back.txt")).unwrap(), content);
}

#[test]
fn dictionary_helps_small_input() {
    let dir = TempDir::new().unwrap();
    let record = gen_pattern(&mut SampleRng::new(2), 512);
    fs::write(dir.path().join("small.txt"), &record).unwrap();
    fs::write(dir.path().join("dict.bin"), gen_repeat(16 << 10)).unwrap();

    assert!(run(dir.path(), &["compress", "small.txt", "plain.zst"]).status.success());
    assert!(run(dir.path(), &["compress", "-D", "dict.bin", "small.txt", "dict.zst"])
        .status
        .success());
    let plain = fs::metadata(dir.path().join("plain.zst")).unwrap().len();
    let with_dict = fs::metadata(dir.path().join("dict.zst")).unwrap().len();
    assert!(with_dict < plain, "dict {with_dict} >= plain {plain}");
}

#[test]
fn stdin_to_stdout() {
    let (dir, content) = workspace();
    let mut child = Command::new(bin())
        .args(["-q", "compress", "--no-checksum", "-"])
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&content).unwrap();
    let compressed = child.wait_with_output().unwrap();
    assert!(compressed.status.success());

    let mut child = Command::new(bin())
        .args(["-q", "decompress", "-"])
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(&compressed.stdout)
        .unwrap();
    let decompressed = child.wait_with_output().unwrap();
    assert!(decompressed.status.success());
    assert_eq!(decompressed.stdout, content);
}

// ── 2. Errors and exit codes ─────────────────────────────────────────────────

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &["compress", "nope.txt"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("zprewarm:"));
}

#[test]
fn existing_output_needs_force() {
    let (dir, _) = workspace();
    fs::write(dir.path().join("input.txt.zst"), b"occupied").unwrap();
    let out = run(dir.path(), &["compress", "input.txt"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(fs::read(dir.path().join("input.txt.zst")).unwrap(), b"occupied");

    let out = run(dir.path(), &["compress", "-f", "input.txt"]);
    assert!(out.status.success());
    assert_ne!(fs::read(dir.path().join("input.txt.zst")).unwrap(), b"occupied");
}

#[test]
fn decompress_without_extension_needs_output() {
    let (dir, _) = workspace();
    assert!(run(dir.path(), &["compress", "input.txt", "packed"]).status.success());
    assert_eq!(run(dir.path(), &["decompress", "packed"]).status.code(), Some(1));
    assert!(run(dir.path(), &["decompress", "packed", "unpacked"]).status.success());
}

#[test]
fn corrupt_input_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.zst"), b"this is not a zstd frame").unwrap();
    let out = run(dir.path(), &["decompress", "bad.zst"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("bad").exists());
}

#[test]
fn invalid_level_fails() {
    let (dir, _) = workspace();
    let out = run(dir.path(), &["compress", "-l", "40", "input.txt"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn env_level_is_used() {
    let (dir, content) = workspace();
    let out = Command::new(bin())
        .args(["compress", "input.txt", "env.zst"])
        .env("ZPREWARM_CLEVEL", "19")
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(run(dir.path(), &["decompress", "env.zst", "env.txt"]).status.success());
    assert_eq!(fs::read(dir.path().join("env.txt")).unwrap(), content);
}

// ── 3. Misc ──────────────────────────────────────────────────────────────────

#[test]
fn version_flag() {
    let out = Command::new(bin()).arg("--version").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn bench_small_grid() {
    let dir = TempDir::new().unwrap();
    let out = run(
        dir.path(),
        &[
            "bench", "--size", "256", "--iterations", "5", "--threads", "1,2", "--prewarm", "1",
        ],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().filter(|l| l.contains("ns/op")).count(), 4);
    assert!(stdout.contains("encode_all_prewarmed/threads=2/prewarm=1"));
}
