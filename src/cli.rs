use clap::Parser;
use std::path::PathBuf;

use crate::config::PublishConfig;

/// Command-line arguments for the artifact publisher.
///
/// Every option also exists in the YAML configuration file; flags given on
/// the command line override the file.
#[derive(Parser, Debug)]
#[clap(
    name = "artifact-publisher",
    about = "Publish CI build and test output to object storage with browsable indexes"
)]
pub struct Args {
    /// Path to configuration YAML file
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Container (bucket) to upload into
    #[clap(long)]
    pub container: Option<String>,

    /// Object prefix inside the container
    #[clap(short, long)]
    pub prefix: Option<String>,

    /// Do not make the container publicly readable
    #[clap(long)]
    pub no_public: bool,

    /// Move the first prefix segment into the container name
    #[clap(long)]
    pub partition: bool,

    /// Do not generate index.html listings
    #[clap(long)]
    pub no_indexes: bool,

    /// Do not add ".." links to listings
    #[clap(long)]
    pub no_parent_links: bool,

    /// Add a ".." link to the top-level listing
    #[clap(long)]
    pub topdir_parent_link: bool,

    /// Name of a file whose contents are appended to listings
    #[clap(long)]
    pub footer: Option<String>,

    /// Delete uploaded objects after this many seconds
    #[clap(long)]
    pub delete_after: Option<u64>,

    /// Maximum number of concurrent uploads
    #[clap(long)]
    pub max_threads: Option<usize>,

    /// Upload a single archive for server-side extraction
    #[clap(long)]
    pub archive_mode: bool,

    /// Prepare everything but skip all uploads
    #[clap(long)]
    pub dry_run: bool,

    /// AWS region for S3 uploads
    #[clap(long)]
    pub region: Option<String>,

    /// Custom S3 endpoint URL
    #[clap(long)]
    pub endpoint: Option<String>,

    /// AWS profile to use for S3 uploads
    #[clap(long)]
    pub profile: Option<String>,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Files and directories to publish (a trailing "/" publishes only the contents)
    pub files: Vec<PathBuf>,
}

impl Args {
    /// Overlay command-line values onto a loaded configuration.
    pub fn apply_to(&self, config: &mut PublishConfig) {
        if let Some(container) = &self.container {
            config.container = container.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = Some(prefix.clone());
        }
        if self.no_public {
            config.public = false;
        }
        if self.partition {
            config.partition = true;
        }
        if self.no_indexes {
            config.indexes = false;
        }
        if self.no_parent_links {
            config.parent_links = false;
        }
        if self.topdir_parent_link {
            config.topdir_parent_link = true;
        }
        if let Some(footer) = &self.footer {
            config.footer = Some(footer.clone());
        }
        if self.delete_after.is_some() {
            config.delete_after = self.delete_after;
        }
        if let Some(max_threads) = self.max_threads {
            config.max_threads = max_threads;
        }
        if self.archive_mode {
            config.archive_mode = true;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(region) = &self.region {
            config.s3.region = Some(region.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.s3.endpoint = Some(endpoint.clone());
        }
        if let Some(profile) = &self.profile {
            config.s3.profile = Some(profile.clone());
        }
        if !self.files.is_empty() {
            config.files = self.files.clone();
        }
    }
}
