//! Concurrent upload of a prepared manifest.
//!
//! The [`Uploader`] provisions the destination container once, then fans
//! the manifest out over a pool of named worker threads fed from a shared
//! queue. Each entry is retried on its own; entries that still fail are
//! collected as [`FailureRecord`]s while the rest of the batch carries on.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};

use crate::cloud::backend::{Backend, Body, Headers};
use crate::cloud::retry::RetryPolicy;
use crate::constants::{
    ARCHIVE_NAME, DRY_RUN_ENDPOINT, DRY_RUN_PATH, HEADER_CONTENT_ENCODING, HEADER_CONTENT_TYPE,
    HEADER_DELETE_AFTER, MAX_UPLOAD_THREADS,
};
use crate::manifest::mime::is_text_type;
use crate::manifest::Manifest;
use crate::models::{FailureRecord, FileEntry};
use crate::utils::archive::build_archive;
use crate::utils::compress::GzipStream;

/// Container and object prefix entries are published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub container: String,
    pub prefix: String,
}

impl Destination {
    /// Normalize a container/prefix pair.
    ///
    /// Leading slashes are stripped from the prefix. With `partition` set
    /// and a prefix of more than one segment, the first segment moves into
    /// the container name: `("logs", "ab/123/check")` becomes
    /// `("logs_ab", "123/check")`.
    pub fn resolve(container: &str, prefix: Option<&str>, partition: bool) -> Self {
        let mut container = container.to_string();
        let mut prefix = prefix.unwrap_or("").trim_start_matches('/').to_string();

        if partition && !prefix.is_empty() {
            if let Some((first, rest)) = prefix.split_once('/') {
                container = format!("{}_{}", container, first);
                prefix = rest.to_string();
            }
        }

        Destination { container, prefix }
    }

    /// Container-relative path of the prefix, as shown in public URLs.
    pub fn path(&self) -> String {
        join_path(&self.container, &self.prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Make the container publicly readable
    pub public: bool,
    /// Object lifetime in seconds, sent as `x-delete-after`
    pub delete_after: Option<u64>,
    pub max_threads: usize,
    /// Upload one tar.gz for server-side extraction instead of each entry
    pub archive_mode: bool,
    /// Skip every backend call and report a placeholder URL
    pub dry_run: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            public: true,
            delete_after: None,
            max_threads: MAX_UPLOAD_THREADS,
            archive_mode: false,
            dry_run: false,
        }
    }
}

/// Outcome of an upload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub url: String,
    pub endpoint: String,
    pub path: String,
    pub failures: Vec<FailureRecord>,
}

impl UploadReport {
    /// Placeholder report for a run that skips every backend call.
    pub fn dry_run(manifest: &Manifest) -> Self {
        info!("Dry run, skipping upload of {} entries", manifest.len());
        UploadReport {
            url: join_url(DRY_RUN_ENDPOINT, DRY_RUN_PATH),
            endpoint: DRY_RUN_ENDPOINT.to_string(),
            path: DRY_RUN_PATH.to_string(),
            failures: Vec::new(),
        }
    }
}

/// Marker attached to errors raised while opening a local source file.
#[derive(Debug)]
struct LocalFileError(PathBuf);

impl fmt::Display for LocalFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to open {}", self.0.display())
    }
}

pub struct Uploader<B: Backend> {
    backend: B,
    destination: Destination,
    options: UploadOptions,
    retry: RetryPolicy,
}

impl<B: Backend> Uploader<B> {
    pub fn new(backend: B, destination: Destination, options: UploadOptions) -> Self {
        Uploader {
            backend,
            destination,
            options,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Publish every entry of `manifest`.
    ///
    /// Returns `Err` only when the destination cannot be prepared; failures
    /// of individual entries are listed in the report.
    pub fn upload(&self, manifest: &Manifest) -> Result<UploadReport> {
        debug!("List of files prepared to upload:");
        for entry in manifest {
            debug!("  {}", entry);
        }

        if self.options.dry_run {
            return Ok(UploadReport::dry_run(manifest));
        }

        if self.options.archive_mode && !self.backend.supports_archive() {
            bail!("Archive mode requested but the backend cannot extract archives");
        }

        let container = &self.destination.container;
        info!("Preparing container {}", container);
        self.retry
            .run(|| self.backend.ensure_container(container, self.options.public))
            .with_context(|| format!("Failed to prepare container {}", container))?;
        let endpoint = self
            .retry
            .run(|| self.backend.resolve_public_url())
            .context("Failed to resolve public URL")?;

        let path = self.destination.path();
        let failures = if self.options.archive_mode {
            self.upload_archive(manifest)?
        } else {
            self.upload_entries(manifest)
        };

        info!(
            "Uploaded {} entries to {} with {} failures",
            manifest.len(),
            path,
            failures.len()
        );
        Ok(UploadReport {
            url: join_url(&endpoint, &path),
            endpoint,
            path,
            failures,
        })
    }

    fn upload_entries(&self, manifest: &Manifest) -> Vec<FailureRecord> {
        let (job_tx, job_rx) = unbounded::<&FileEntry>();
        for entry in manifest {
            // Receiver is alive, so this cannot fail
            let _ = job_tx.send(entry);
        }
        drop(job_tx);

        let (failure_tx, failure_rx) = unbounded();
        let num_threads = manifest.len().min(self.options.max_threads.max(1));
        debug!("Starting {} upload workers", num_threads);

        thread::scope(|scope| {
            for i in 0..num_threads {
                let jobs = job_rx.clone();
                let failures = failure_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("upload-{}", i))
                    .spawn_scoped(scope, move || self.worker(jobs, failures));
                if let Err(e) = spawned {
                    warn!("Failed to spawn upload worker {}: {}", i, e);
                }
            }
        });
        drop(failure_tx);

        // Nothing was consumed if every spawn failed
        let mut failures: Vec<FailureRecord> = failure_rx.try_iter().collect();
        for entry in job_rx.try_iter() {
            failures.push(FailureRecord {
                file: entry.relative_path.clone(),
                error: "No upload worker available".to_string(),
            });
        }
        failures
    }

    fn worker(&self, jobs: Receiver<&FileEntry>, failures: Sender<FailureRecord>) {
        let name = thread::current().name().unwrap_or("upload").to_string();
        debug!("{}: started", name);

        while let Ok(entry) = jobs.recv() {
            debug!("{}: processing job {}", name, entry);
            if let Err(e) = self.post_entry(entry) {
                let record = failure_record(entry, &e);
                warn!("{}: {}: {}", name, record.file, record.error);
                let _ = failures.send(record);
            }
        }

        debug!("{}: queue drained", name);
    }

    /// Upload one entry, retrying the whole request on failure.
    fn post_entry(&self, entry: &FileEntry) -> Result<()> {
        let object = object_name(&self.destination.prefix, entry);
        let (compress, encoding) = self.transfer_encoding(entry);
        let headers = self.headers(entry, encoding.as_deref());

        if entry.is_folder {
            return self
                .retry
                .run(|| self.backend.put_object(&object, Box::new(io::empty()), &headers));
        }

        let full_path = entry
            .full_path
            .as_ref()
            .ok_or_else(|| anyhow!("Entry {} has no local path", entry.relative_path))?;

        self.retry.run(|| {
            let file = File::open(full_path).context(LocalFileError(full_path.clone()))?;
            let body: Body = if compress {
                Box::new(GzipStream::new(file))
            } else {
                Box::new(file)
            };
            self.backend.put_object(&object, body, &headers)
        })
    }

    /// Decide whether to gzip on the fly and which `content-encoding` to send.
    fn transfer_encoding(&self, entry: &FileEntry) -> (bool, Option<String>) {
        if entry.is_folder {
            return (false, None);
        }
        match &entry.content_encoding {
            None if is_text_type(&entry.mime_type) => (true, Some("gzip".to_string())),
            None => (false, None),
            // Already-gzipped names are served as-is so browsers keep the archive intact
            Some(_) if entry.filename.ends_with(".gz") => (false, None),
            Some(encoding) if self.backend.forward_source_encoding() => {
                (false, Some(encoding.clone()))
            }
            Some(_) => (false, None),
        }
    }

    fn headers(&self, entry: &FileEntry, encoding: Option<&str>) -> Headers {
        let mut headers = Headers::new();
        headers.insert(HEADER_CONTENT_TYPE.to_string(), entry.mime_type.clone());
        if let Some(encoding) = encoding {
            headers.insert(HEADER_CONTENT_ENCODING.to_string(), encoding.to_string());
        }
        if let Some(seconds) = self.options.delete_after {
            headers.insert(HEADER_DELETE_AFTER.to_string(), seconds.to_string());
        }
        headers
    }

    fn upload_archive(&self, manifest: &Manifest) -> Result<Vec<FailureRecord>> {
        let archive = build_archive(manifest)?;

        let mut headers = Headers::new();
        headers.insert(HEADER_CONTENT_TYPE.to_string(), "application/gzip".to_string());
        if let Some(seconds) = self.options.delete_after {
            headers.insert(HEADER_DELETE_AFTER.to_string(), seconds.to_string());
        }

        let result = self.retry.run(|| {
            let file = archive
                .reopen()
                .context(LocalFileError(archive.path().to_path_buf()))?;
            self.backend
                .put_archive(&self.destination.prefix, Box::new(file), &headers)
        });

        Ok(match result {
            Ok(()) => Vec::new(),
            Err(e) => {
                let record = FailureRecord {
                    file: ARCHIVE_NAME.to_string(),
                    error: describe_failure(&e),
                };
                warn!("{}: {}", record.file, record.error);
                vec![record]
            }
        })
    }
}

fn failure_record(entry: &FileEntry, err: &anyhow::Error) -> FailureRecord {
    FailureRecord {
        file: entry.relative_path.clone(),
        error: describe_failure(err),
    }
}

fn describe_failure(err: &anyhow::Error) -> String {
    if err.downcast_ref::<LocalFileError>().is_some() {
        format!("Error opening file: {:#}", err)
    } else {
        format!("Error posting file after multiple attempts: {:#}", err)
    }
}

/// Object name of an entry under `prefix`.
///
/// Folder markers drop the trailing slash; the root marker with an empty
/// prefix is named `/`.
pub fn object_name(prefix: &str, entry: &FileEntry) -> String {
    let name = join_path(prefix, &entry.relative_path);
    if !entry.is_folder {
        return name;
    }
    let trimmed = name.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Join two slash-separated path fragments.
pub fn join_path(base: &str, rest: &str) -> String {
    if base.is_empty() {
        rest.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, rest)
    } else {
        format!("{}/{}", base, rest)
    }
}

fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
