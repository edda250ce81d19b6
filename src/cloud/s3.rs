//! Amazon S3 (and S3-compatible) backend.
//!
//! Object bodies are streamed in fixed-size parts. A body that fits in one
//! part is sent with a single `PutObject`; anything larger goes through a
//! multipart upload, which is aborted if any part fails. At most two parts
//! are held in memory per upload.

use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use rusoto_core::{ByteStream, Region, RusotoError};
use rusoto_s3::{
    AbortMultipartUploadRequest, CompleteMultipartUploadRequest, CompletedMultipartUpload,
    CompletedPart, CreateBucketConfiguration, CreateBucketRequest, CreateMultipartUploadRequest,
    HeadBucketError, HeadBucketRequest, PutBucketAclRequest, PutObjectRequest, S3Client,
    UploadPartRequest, S3,
};
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use crate::cloud::backend::{Backend, Body, Headers};
use crate::cloud::client::{create_s3_client, resolve_region};
use crate::constants::{
    DEFAULT_S3_ENDPOINT, HEADER_CONTENT_ENCODING, HEADER_CONTENT_TYPE, HEADER_DELETE_AFTER,
    S3_PART_SIZE,
};

const PUBLIC_READ_ACL: &str = "public-read";
const PRIVATE_ACL: &str = "private";

/// Connection settings for the S3 backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible storage
    pub endpoint: Option<String>,
    /// Named credentials profile
    pub profile: Option<String>,
}

/// Backend storing objects in an S3 bucket.
///
/// Requests are driven on a private runtime so upload workers can call in
/// from plain threads.
pub struct S3Backend {
    client: Arc<S3Client>,
    runtime: Runtime,
    region: Region,
    bucket: String,
    endpoint: String,
    public: AtomicBool,
}

/// Splits a body into parts of at most `part_size` bytes.
///
/// The first part is always produced (empty for an empty body); later parts
/// only while the source has data left.
struct Parts<R: Read> {
    source: R,
    part_size: usize,
    started: bool,
    exhausted: bool,
}

impl<R: Read> Parts<R> {
    fn new(source: R, part_size: usize) -> Self {
        Parts {
            source,
            part_size: part_size.max(1),
            started: false,
            exhausted: false,
        }
    }

    fn next_part(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut part = Vec::with_capacity(self.part_size);
        (&mut self.source)
            .take(self.part_size as u64)
            .read_to_end(&mut part)?;

        if part.len() < self.part_size {
            self.exhausted = true;
        }
        if part.is_empty() && self.started {
            return Ok(None);
        }
        self.started = true;
        Ok(Some(part))
    }
}

/// How a body is sent, decided from its first two parts.
#[derive(Debug, PartialEq, Eq)]
enum UploadPlan {
    /// The whole body fits in one part
    Single(Vec<u8>),
    /// First and second part; further parts are pulled while uploading
    Multipart(Vec<u8>, Vec<u8>),
}

fn plan_upload<R: Read>(parts: &mut Parts<R>) -> io::Result<UploadPlan> {
    let first = parts.next_part()?.unwrap_or_default();
    Ok(match parts.next_part()? {
        Some(second) => UploadPlan::Multipart(first, second),
        None => UploadPlan::Single(first),
    })
}

/// Whether a failed `HeadBucket` means the bucket does not exist.
///
/// HEAD responses carry no body, so a missing bucket usually surfaces as
/// an unparsed 404 rather than the typed error.
fn is_missing_bucket(err: &RusotoError<HeadBucketError>) -> bool {
    match err {
        RusotoError::Service(HeadBucketError::NoSuchBucket(_)) => true,
        RusotoError::Unknown(response) => response.status.as_u16() == 404,
        _ => false,
    }
}

fn bucket_acl(public: bool) -> &'static str {
    if public {
        PUBLIC_READ_ACL
    } else {
        PRIVATE_ACL
    }
}

/// `x-delete-after` is carried as user metadata.
fn object_metadata(headers: &Headers) -> Option<HashMap<String, String>> {
    headers.get(HEADER_DELETE_AFTER).map(|seconds| {
        let mut metadata = HashMap::new();
        metadata.insert("delete-after".to_string(), seconds.clone());
        metadata
    })
}

impl S3Backend {
    pub fn new(config: &S3Config) -> Result<Self> {
        let region = resolve_region(config.region.as_deref(), config.endpoint.as_deref());
        let client = create_s3_client(region.clone(), config.profile.as_deref())?;
        let runtime = Runtime::new().context("Failed to create Tokio runtime")?;

        Ok(S3Backend {
            client,
            runtime,
            region,
            bucket: config.bucket.clone(),
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_S3_ENDPOINT.to_string()),
            public: AtomicBool::new(false),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        match &self.region {
            Region::UsEast1 | Region::Custom { .. } => None,
            region => Some(CreateBucketConfiguration {
                location_constraint: Some(region.name().to_string()),
            }),
        }
    }

    fn object_acl(&self) -> Option<String> {
        self.public
            .load(Ordering::SeqCst)
            .then(|| PUBLIC_READ_ACL.to_string())
    }

    fn put_single(&self, path: &str, contents: Vec<u8>, headers: &Headers) -> Result<()> {
        let length = contents.len();
        let request = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: path.to_string(),
            body: Some(ByteStream::from(contents)),
            content_type: headers.get(HEADER_CONTENT_TYPE).cloned(),
            content_encoding: headers.get(HEADER_CONTENT_ENCODING).cloned(),
            acl: self.object_acl(),
            metadata: object_metadata(headers),
            ..Default::default()
        };

        self.runtime
            .block_on(self.client.put_object(request))
            .with_context(|| format!("Failed to upload s3://{}/{}", self.bucket, path))?;
        debug!("Uploaded s3://{}/{} ({} bytes)", self.bucket, path, length);
        Ok(())
    }

    fn put_multipart<R: Read>(
        &self,
        path: &str,
        first: Vec<u8>,
        second: Vec<u8>,
        parts: &mut Parts<R>,
        headers: &Headers,
    ) -> Result<()> {
        let created = self
            .runtime
            .block_on(self.client.create_multipart_upload(CreateMultipartUploadRequest {
                bucket: self.bucket.clone(),
                key: path.to_string(),
                content_type: headers.get(HEADER_CONTENT_TYPE).cloned(),
                content_encoding: headers.get(HEADER_CONTENT_ENCODING).cloned(),
                acl: self.object_acl(),
                metadata: object_metadata(headers),
                ..Default::default()
            }))
            .with_context(|| format!("Failed to start multipart upload of {}", path))?;
        let upload_id = created
            .upload_id
            .ok_or_else(|| anyhow!("No upload ID returned for {}", path))?;
        debug!("Started multipart upload {} for {}", upload_id, path);

        let result = self
            .upload_parts(path, &upload_id, first, second, parts)
            .and_then(|completed| self.complete_multipart(path, &upload_id, completed));

        if result.is_err() {
            let aborted = self
                .runtime
                .block_on(self.client.abort_multipart_upload(AbortMultipartUploadRequest {
                    bucket: self.bucket.clone(),
                    key: path.to_string(),
                    upload_id: upload_id.clone(),
                    ..Default::default()
                }));
            if let Err(e) = aborted {
                warn!("Failed to abort multipart upload {} for {}: {}", upload_id, path, e);
            }
        }
        result
    }

    fn upload_parts<R: Read>(
        &self,
        path: &str,
        upload_id: &str,
        first: Vec<u8>,
        second: Vec<u8>,
        parts: &mut Parts<R>,
    ) -> Result<Vec<CompletedPart>> {
        let mut completed = Vec::new();
        let mut queued = Some(second);
        let mut current = Some(first);
        let mut part_number: i64 = 0;

        while let Some(data) = current.take() {
            part_number += 1;
            let length = data.len() as i64;
            let output = self
                .runtime
                .block_on(self.client.upload_part(UploadPartRequest {
                    bucket: self.bucket.clone(),
                    key: path.to_string(),
                    upload_id: upload_id.to_string(),
                    part_number,
                    content_length: Some(length),
                    body: Some(ByteStream::from(data)),
                    ..Default::default()
                }))
                .with_context(|| format!("Failed to upload part {} of {}", part_number, path))?;
            let e_tag = output
                .e_tag
                .ok_or_else(|| anyhow!("No ETag returned for part {} of {}", part_number, path))?;
            completed.push(CompletedPart {
                e_tag: Some(e_tag),
                part_number: Some(part_number),
            });

            current = match queued.take() {
                Some(next) => Some(next),
                None => parts
                    .next_part()
                    .with_context(|| format!("Failed to read content for {}", path))?,
            };
        }

        Ok(completed)
    }

    fn complete_multipart(
        &self,
        path: &str,
        upload_id: &str,
        completed: Vec<CompletedPart>,
    ) -> Result<()> {
        let count = completed.len();
        self.runtime
            .block_on(self.client.complete_multipart_upload(CompleteMultipartUploadRequest {
                bucket: self.bucket.clone(),
                key: path.to_string(),
                upload_id: upload_id.to_string(),
                multipart_upload: Some(CompletedMultipartUpload {
                    parts: Some(completed),
                }),
                ..Default::default()
            }))
            .with_context(|| format!("Failed to complete multipart upload of {}", path))?;
        debug!("Uploaded s3://{}/{} in {} parts", self.bucket, path, count);
        Ok(())
    }
}

impl Backend for S3Backend {
    fn ensure_container(&self, name: &str, public: bool) -> Result<()> {
        self.public.store(public, Ordering::SeqCst);
        let acl = bucket_acl(public);

        let head = self.runtime.block_on(self.client.head_bucket(HeadBucketRequest {
            bucket: name.to_string(),
            ..Default::default()
        }));
        match head {
            Ok(_) => {
                debug!("Bucket {} already exists, applying {} ACL", name, acl);
                let applied = self.runtime.block_on(self.client.put_bucket_acl(PutBucketAclRequest {
                    bucket: name.to_string(),
                    acl: Some(acl.to_string()),
                    ..Default::default()
                }));
                // Buckets enforcing object ownership reject ACL changes; object ACLs still apply
                if let Err(e) = applied {
                    warn!("Failed to set {} ACL on bucket {}: {}", acl, name, e);
                }
                return Ok(());
            }
            Err(e) if is_missing_bucket(&e) => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to check bucket {}", name));
            }
        }

        info!("Creating bucket {}", name);
        let request = CreateBucketRequest {
            bucket: name.to_string(),
            acl: Some(acl.to_string()),
            create_bucket_configuration: self.bucket_configuration(),
            ..Default::default()
        };
        self.runtime
            .block_on(self.client.create_bucket(request))
            .with_context(|| format!("Failed to create bucket {}", name))?;
        Ok(())
    }

    fn put_object(&self, path: &str, body: Body, headers: &Headers) -> Result<()> {
        let mut parts = Parts::new(body, S3_PART_SIZE);
        let plan = plan_upload(&mut parts)
            .with_context(|| format!("Failed to read content for {}", path))?;

        match plan {
            UploadPlan::Single(contents) => self.put_single(path, contents, headers),
            UploadPlan::Multipart(first, second) => {
                self.put_multipart(path, first, second, &mut parts, headers)
            }
        }
    }

    fn resolve_public_url(&self) -> Result<String> {
        Ok(self.endpoint.clone())
    }
}
