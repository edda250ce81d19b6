use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use rusoto_core::{HttpClient, Region};
use rusoto_credential::ProfileProvider;
use rusoto_s3::S3Client;

/// Resolve the region to talk to, honoring a custom endpoint.
///
/// With an endpoint (S3-compatible storage such as Ceph or MinIO) the
/// region name is only used for request signing.
pub fn resolve_region(region_name: Option<&str>, endpoint: Option<&str>) -> Region {
    if let Some(endpoint) = endpoint {
        return Region::Custom {
            name: region_name.unwrap_or("us-east-1").to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        };
    }

    match region_name {
        Some(name) => match name.parse::<Region>() {
            Ok(r) => r,
            Err(_) => {
                warn!("Invalid region '{}', using default", name);
                Region::default()
            }
        },
        None => Region::default(),
    }
}

/// Create an S3 client for the given region, using a named credentials
/// profile when one is given.
pub fn create_s3_client(region: Region, profile: Option<&str>) -> Result<Arc<S3Client>> {
    let client = match profile {
        Some(profile_name) => match ProfileProvider::new() {
            Ok(mut provider) => {
                debug!("Using AWS profile {}", profile_name);
                provider.set_profile(profile_name);
                let http_client = HttpClient::new().context("Failed to create HTTP client")?;
                S3Client::new_with(http_client, provider, region)
            }
            Err(e) => {
                warn!("Failed to create AWS profile provider: {}, using default", e);
                S3Client::new(region)
            }
        },
        None => S3Client::new(region),
    };

    Ok(Arc::new(client))
}
