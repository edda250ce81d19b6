//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tempfile::TempDir;

use artifact_publisher::cloud::retry::RetryPolicy;
use artifact_publisher::cloud::{Backend, Body, Headers};

/// Build a small CI log tree under `<tmp>/logs`.
pub fn create_log_tree() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let logs = temp_dir.path().join("logs");

    fs::create_dir_all(logs.join("controller/subdir"))?;
    fs::create_dir_all(logs.join("zuul-info"))?;

    fs::write(logs.join("controller/subdir/foo::3.txt"), b"foo")?;
    fs::write(logs.join("controller/subdir/subdir.txt"), b"subdir")?;
    fs::write(logs.join("controller/service_log.txt"), b"service started\n")?;
    fs::write(logs.join("controller/journal.xz"), b"\xfd7zXZ\x00")?;
    fs::write(logs.join("controller/syslog"), b"kernel: booted\n")?;
    fs::write(logs.join("zuul-info/inventory.yaml"), b"all: {}\n")?;
    fs::write(logs.join("job-output.json"), b"{}")?;

    Ok(temp_dir)
}

/// Collect every relative path of a manifest.
pub fn relative_paths<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a artifact_publisher::models::FileEntry>,
{
    entries
        .into_iter()
        .map(|e| e.relative_path.clone())
        .collect()
}

/// One stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub headers: Headers,
}

/// In-memory backend recording every call.
///
/// `fail_times` makes the first N `put_object` calls for a path fail.
#[derive(Default)]
pub struct RecordingBackend {
    pub containers: Mutex<Vec<(String, bool)>>,
    pub objects: Mutex<HashMap<String, StoredObject>>,
    pub attempts: Mutex<HashMap<String, usize>>,
    pub fail_times: HashMap<String, usize>,
    pub archive: bool,
    pub archives: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(path: &str, times: usize) -> Self {
        let mut backend = Self::default();
        backend.fail_times.insert(path.to_string(), times);
        backend
    }

    pub fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    pub fn object_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn attempts_for(&self, path: &str) -> usize {
        self.attempts.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

impl Backend for RecordingBackend {
    fn ensure_container(&self, name: &str, public: bool) -> Result<()> {
        self.containers
            .lock()
            .unwrap()
            .push((name.to_string(), public));
        Ok(())
    }

    fn put_object(&self, path: &str, mut body: Body, headers: &Headers) -> Result<()> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(path.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if attempt <= self.fail_times.get(path).copied().unwrap_or(0) {
            return Err(anyhow!("simulated transport failure {}", attempt));
        }

        let mut data = Vec::new();
        body.read_to_end(&mut data)?;
        self.objects.lock().unwrap().insert(
            path.to_string(),
            StoredObject {
                body: data,
                headers: headers.clone(),
            },
        );
        Ok(())
    }

    fn resolve_public_url(&self) -> Result<String> {
        Ok("https://storage.example.com/".to_string())
    }

    fn supports_archive(&self) -> bool {
        self.archive
    }

    fn put_archive(&self, prefix: &str, mut body: Body, _headers: &Headers) -> Result<()> {
        let mut data = Vec::new();
        body.read_to_end(&mut data)?;
        self.archives
            .lock()
            .unwrap()
            .push((prefix.to_string(), data));
        Ok(())
    }
}

/// Retry policy that records requested delays instead of sleeping.
pub fn recording_retry() -> (RetryPolicy, Arc<Mutex<Vec<Duration>>>) {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&delays);
    let policy = RetryPolicy::default()
        .with_sleeper(Arc::new(move |d: Duration| recorded.lock().unwrap().push(d)));
    (policy, delays)
}

/// Path of `name` inside the fixture's `logs` directory.
pub fn logs_path(fixture: &TempDir, name: &str) -> std::path::PathBuf {
    fixture.path().join("logs").join(name)
}

/// `dir` with a trailing separator, publishing only its contents.
pub fn contents_of(dir: &Path) -> String {
    format!("{}/", dir.display())
}
