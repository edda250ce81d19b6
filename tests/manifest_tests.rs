//! Integration tests for enumerating input paths into a manifest.

mod common;

use std::collections::HashSet;
use std::fs;

use anyhow::Result;
use proptest::prelude::*;
use tempfile::TempDir;

use artifact_publisher::manifest::Manifest;
use common::{contents_of, create_log_tree, logs_path, relative_paths};

#[test]
fn test_trailing_slash_semantics() -> Result<()> {
    let fixture = create_log_tree()?;

    let mut with_slash = Manifest::new();
    with_slash.add(contents_of(&logs_path(&fixture, "")))?;
    let mut without_slash = Manifest::new();
    without_slash.add(fixture.path().join("logs"))?;

    let with_paths = relative_paths(&with_slash);
    let without_paths = relative_paths(&without_slash);

    assert!(!with_paths.contains(&"logs".to_string()));
    assert_eq!(without_paths[1], "logs");
    assert_eq!(without_paths.len(), with_paths.len() + 1);

    // Same tree, shifted under the wrapper
    let shifted: Vec<String> = with_paths[1..]
        .iter()
        .map(|p| format!("logs/{}", p))
        .collect();
    assert_eq!(&without_paths[2..], shifted.as_slice());
    Ok(())
}

#[test]
fn test_walk_order() -> Result<()> {
    let fixture = create_log_tree()?;
    let mut manifest = Manifest::new();
    manifest.add(contents_of(&logs_path(&fixture, "")))?;

    assert_eq!(
        relative_paths(&manifest),
        vec![
            "",
            "controller",
            "zuul-info",
            "job-output.json",
            "controller/subdir",
            "controller/journal.xz",
            "controller/service_log.txt",
            "controller/syslog",
            "controller/subdir/foo::3.txt",
            "controller/subdir/subdir.txt",
            "zuul-info/inventory.yaml",
        ]
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlink_escaping_root_is_dropped() -> Result<()> {
    use std::os::unix::fs::symlink;

    let fixture = create_log_tree()?;
    let outside = TempDir::new()?;
    fs::write(outside.path().join("secret.txt"), "secret")?;
    fs::create_dir(outside.path().join("private"))?;

    let logs = logs_path(&fixture, "");
    symlink(outside.path().join("secret.txt"), logs.join("leak.txt"))?;
    symlink(outside.path().join("private"), logs.join("leak-dir"))?;

    let mut manifest = Manifest::new();
    manifest.add(contents_of(&logs))?;

    let paths = relative_paths(&manifest);
    assert!(!paths.iter().any(|p| p.contains("leak")));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinks_inside_root() -> Result<()> {
    use std::os::unix::fs::symlink;

    let fixture = create_log_tree()?;
    let logs = logs_path(&fixture, "");
    symlink(logs.join("job-output.json"), logs.join("alias.json"))?;
    // Cycle back to the root: listed as a folder, never descended into
    symlink(&logs, logs.join("controller/loop"))?;

    let mut manifest = Manifest::new();
    manifest.add(contents_of(&logs))?;
    let paths = relative_paths(&manifest);

    assert_eq!(paths.iter().filter(|p| *p == "alias.json").count(), 1);
    let alias = manifest.get("alias.json").unwrap();
    assert!(!alias.is_folder);
    assert_eq!(alias.mime_type, "application/json");

    let link = manifest.get("controller/loop").unwrap();
    assert!(link.is_folder);
    assert!(!paths.iter().any(|p| p.starts_with("controller/loop/")));
    Ok(())
}

#[test]
fn test_merge_file_and_directory() -> Result<()> {
    let fixture = create_log_tree()?;
    let mut manifest = Manifest::new();
    manifest.add(logs_path(&fixture, "job-output.json"))?;
    manifest.add(logs_path(&fixture, "zuul-info"))?;

    assert_eq!(
        relative_paths(&manifest),
        vec!["", "job-output.json", "zuul-info", "zuul-info/inventory.yaml"]
    );
    Ok(())
}

#[test]
fn test_add_is_idempotent() -> Result<()> {
    let fixture = create_log_tree()?;
    let mut manifest = Manifest::new();
    manifest.add(logs_path(&fixture, "zuul-info"))?;
    let first = relative_paths(&manifest);

    manifest.add(logs_path(&fixture, "zuul-info"))?;
    assert_eq!(relative_paths(&manifest), first);
    Ok(())
}

#[test]
fn test_merge_same_basename_lists_each_path_once() -> Result<()> {
    let first = TempDir::new()?;
    let second = TempDir::new()?;
    fs::create_dir_all(first.path().join("logs"))?;
    fs::create_dir_all(second.path().join("logs"))?;
    fs::write(first.path().join("logs/shared.txt"), "first")?;
    fs::write(first.path().join("logs/only-first.txt"), "first")?;
    fs::write(second.path().join("logs/shared.txt"), "second")?;
    fs::write(second.path().join("logs/only-second.txt"), "second")?;

    let mut manifest = Manifest::new();
    manifest.add(first.path().join("logs"))?;
    manifest.add(second.path().join("logs"))?;

    let paths = relative_paths(&manifest);
    let unique: HashSet<&String> = paths.iter().collect();
    assert_eq!(unique.len(), paths.len());
    assert_eq!(
        paths,
        vec![
            "",
            "logs",
            "logs/only-first.txt",
            "logs/shared.txt",
            "logs/only-second.txt",
        ]
    );

    // The first source wins for a shared path
    let shared = manifest.get("logs/shared.txt").unwrap();
    assert!(shared.full_path.as_ref().unwrap().starts_with(first.path()));
    Ok(())
}

fn build_tree(root: &std::path::Path, files: &[(String, String)]) -> Result<HashSet<String>> {
    let mut expected = HashSet::new();
    for (dir, name) in files {
        let relative = if dir.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", dir, name)
        };
        let path = root.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Skip names that collide with a directory created earlier
        if path.is_dir() {
            continue;
        }
        fs::write(&path, relative.as_bytes())?;
        expected.insert(relative);
    }
    Ok(expected)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_every_file_listed_once(
        files in proptest::collection::vec(
            ("(d[0-2](/e[0-2])?)?", "[a-z]{1,6}\\.txt"),
            1..20,
        )
    ) {
        let temp_dir = TempDir::new().unwrap();
        let expected = build_tree(temp_dir.path(), &files).unwrap();

        let mut manifest = Manifest::new();
        manifest.add(contents_of(temp_dir.path())).unwrap();

        let listed: Vec<String> = manifest
            .iter()
            .filter(|e| !e.is_folder)
            .map(|e| e.relative_path.clone())
            .collect();
        let unique: HashSet<String> = listed.iter().cloned().collect();

        prop_assert_eq!(listed.len(), unique.len());
        prop_assert_eq!(unique, expected);
    }
}
