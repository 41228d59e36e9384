//! e2e: the `pfar` binary as a black-box CLI tool, covering pack, unpack,
//! list, and rm.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Locate the `pfar` binary produced by Cargo.
fn pfar_bin() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_pfar") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("pfar");
    p
}

fn make_source_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "hello from a").unwrap();
    fs::write(dir.path().join("b.txt"), "hello from b, a bit longer").unwrap();
    dir
}

#[test]
fn pack_then_list_then_unpack_roundtrip() {
    let src = make_source_tree();
    let workdir = TempDir::new().unwrap();
    let archive = workdir.path().join("out.pfar");

    let status = Command::new(pfar_bin())
        .args(["pack"])
        .arg(&archive)
        .arg(src.path().join("a.txt"))
        .arg(src.path().join("b.txt"))
        .status()
        .expect("failed to run pfar pack");
    assert!(status.success());
    assert!(archive.exists());

    let output = Command::new(pfar_bin())
        .arg("list")
        .arg(&archive)
        .output()
        .expect("failed to run pfar list");
    assert!(output.status.success());
    let listing = String::from_utf8_lossy(&output.stdout);
    assert!(listing.contains("a.txt"));
    assert!(listing.contains("b.txt"));

    let extract_dir = workdir.path().join("extracted");
    let status = Command::new(pfar_bin())
        .arg("unpack")
        .arg(&archive)
        .arg("--output")
        .arg(&extract_dir)
        .status()
        .expect("failed to run pfar unpack");
    assert!(status.success());

    assert_eq!(
        fs::read_to_string(extract_dir.join("a.txt")).unwrap(),
        "hello from a"
    );
    assert_eq!(
        fs::read_to_string(extract_dir.join("b.txt")).unwrap(),
        "hello from b, a bit longer"
    );
}

#[test]
fn pack_with_compress_then_unpack_roundtrip() {
    let src = make_source_tree();
    let workdir = TempDir::new().unwrap();
    let archive = workdir.path().join("out.pfar");

    let status = Command::new(pfar_bin())
        .arg("pack")
        .arg(&archive)
        .arg(src.path().join("a.txt"))
        .arg("--compress")
        .status()
        .expect("failed to run pfar pack --compress");
    assert!(status.success());

    let extract_dir = workdir.path().join("extracted");
    let status = Command::new(pfar_bin())
        .arg("unpack")
        .arg(&archive)
        .arg("-o")
        .arg(&extract_dir)
        .status()
        .expect("failed to run pfar unpack");
    assert!(status.success());

    assert_eq!(
        fs::read_to_string(extract_dir.join("a.txt")).unwrap(),
        "hello from a"
    );
}

#[test]
fn rm_removes_named_entry() {
    let src = make_source_tree();
    let workdir = TempDir::new().unwrap();
    let archive = workdir.path().join("out.pfar");

    Command::new(pfar_bin())
        .arg("pack")
        .arg(&archive)
        .arg(src.path().join("a.txt"))
        .arg(src.path().join("b.txt"))
        .status()
        .unwrap();

    let status = Command::new(pfar_bin())
        .arg("rm")
        .arg(&archive)
        .arg("a.txt")
        .status()
        .expect("failed to run pfar rm");
    assert!(status.success());

    let output = Command::new(pfar_bin())
        .arg("list")
        .arg(&archive)
        .output()
        .unwrap();
    let listing = String::from_utf8_lossy(&output.stdout);
    assert!(!listing.contains("a.txt"));
    assert!(listing.contains("b.txt"));
}

#[test]
fn unpack_missing_archive_fails() {
    let workdir = TempDir::new().unwrap();
    let status = Command::new(pfar_bin())
        .arg("unpack")
        .arg(workdir.path().join("does-not-exist.pfar"))
        .arg("-o")
        .arg(workdir.path().join("out"))
        .status()
        .unwrap();
    assert!(!status.success());
}
