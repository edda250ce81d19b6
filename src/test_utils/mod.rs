//! Test utilities for artifact-publisher
//!
//! This module provides common testing utilities and fixtures for use
//! across all test modules.

#![cfg(test)]

use anyhow::Result;
use std::fs;
use std::io::Write;
use tempfile::TempDir;

use flate2::write::GzEncoder;
use flate2::Compression;

/// Creates a temporary directory that is automatically cleaned up
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a CI log tree under `<tmp>/logs`:
///
/// ```text
/// logs/
///   controller/
///     subdir/foo::3.txt, subdir/subdir.txt
///     compressed.gz, cpu-load.svg, journal.xz, service_log.txt, syslog
///   zuul-info/inventory.yaml, zuul-info/zuul-info.controller.txt
///   job-output.json
///   Ꮓບບξ-unicode.txt
/// ```
pub fn create_log_fixture() -> Result<TempDir> {
    let temp_dir = create_temp_dir()?;
    let logs = temp_dir.path().join("logs");

    fs::create_dir_all(logs.join("controller/subdir"))?;
    fs::create_dir_all(logs.join("zuul-info"))?;

    fs::write(logs.join("controller/subdir/foo::3.txt"), b"foo")?;
    fs::write(logs.join("controller/subdir/subdir.txt"), b"subdir")?;

    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(b"compressed content")?;
    fs::write(logs.join("controller/compressed.gz"), gz.finish()?)?;

    fs::write(
        logs.join("controller/cpu-load.svg"),
        b"<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>",
    )?;
    fs::write(logs.join("controller/journal.xz"), b"\xfd7zXZ\x00")?;
    fs::write(logs.join("controller/service_log.txt"), b"service started\n")?;
    fs::write(logs.join("controller/syslog"), b"kernel: booted\n")?;

    fs::write(logs.join("zuul-info/inventory.yaml"), b"all:\n  hosts: {}\n")?;
    fs::write(logs.join("zuul-info/zuul-info.controller.txt"), b"controller\n")?;

    fs::write(logs.join("job-output.json"), b"[{\"playbook\": \"run.yaml\"}]")?;
    fs::write(
        logs.join("\u{13c3}\u{e9a}\u{e9a}\u{3be}-unicode.txt"),
        "unicode".as_bytes(),
    )?;

    Ok(temp_dir)
}
