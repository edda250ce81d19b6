// Re-export all items from the submodules
mod publish_config;

pub use publish_config::{PublishConfig, S3Settings};
