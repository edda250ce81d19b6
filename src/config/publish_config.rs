use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cloud::s3::S3Config;
use crate::cloud::uploader::{Destination, UploadOptions};
use crate::constants::{DEFAULT_FOOTER, MAX_UPLOAD_THREADS};
use crate::index::IndexOptions;

fn default_true() -> bool {
    true
}

fn default_footer() -> Option<String> {
    Some(DEFAULT_FOOTER.to_string())
}

fn default_max_threads() -> usize {
    MAX_UPLOAD_THREADS
}

/// Connection settings for the S3 backend; the bucket comes from `container`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct S3Settings {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
}

/// Settings for one publishing run.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub prefix: Option<String>,
    /// Move the first prefix segment into the container name
    #[serde(default)]
    pub partition: bool,
    #[serde(default = "default_true")]
    pub public: bool,
    /// Generate `index.html` listings
    #[serde(default = "default_true")]
    pub indexes: bool,
    #[serde(default = "default_true")]
    pub parent_links: bool,
    #[serde(default)]
    pub topdir_parent_link: bool,
    #[serde(default = "default_footer")]
    pub footer: Option<String>,
    /// Object lifetime in seconds
    #[serde(default)]
    pub delete_after: Option<u64>,
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    #[serde(default)]
    pub archive_mode: bool,
    #[serde(default)]
    pub dry_run: bool,
    /// Files and directories to publish; a trailing `/` publishes a
    /// directory's contents without the directory itself
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub s3: S3Settings,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            container: String::new(),
            prefix: None,
            partition: false,
            public: true,
            indexes: true,
            parent_links: true,
            topdir_parent_link: false,
            footer: default_footer(),
            delete_after: None,
            max_threads: MAX_UPLOAD_THREADS,
            archive_mode: false,
            dry_run: false,
            files: Vec::new(),
            s3: S3Settings::default(),
        }
    }
}

impl PublishConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: PublishConfig =
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml).context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Load from `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.container.trim().is_empty() {
            bail!("No container name configured");
        }
        if self.max_threads == 0 {
            bail!("max_threads must be at least 1");
        }
        if self.files.is_empty() {
            bail!("No files to publish");
        }
        Ok(())
    }

    pub fn destination(&self) -> Destination {
        Destination::resolve(&self.container, self.prefix.as_deref(), self.partition)
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            create_parent_links: self.parent_links,
            create_topdir_parent_link: self.topdir_parent_link,
            footer: self.footer.clone(),
        }
    }

    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            public: self.public,
            delete_after: self.delete_after,
            max_threads: self.max_threads,
            archive_mode: self.archive_mode,
            dry_run: self.dry_run,
        }
    }

    /// Backend settings for a given (possibly partitioned) bucket.
    pub fn s3_config(&self, bucket: &str) -> S3Config {
        S3Config {
            bucket: bucket.to_string(),
            region: self.s3.region.clone(),
            endpoint: self.s3.endpoint.clone(),
            profile: self.s3.profile.clone(),
        }
    }
}
