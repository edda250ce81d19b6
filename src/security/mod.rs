//! Security utilities for enumeration.
//!
//! This module provides the path containment checks that keep symlinks from
//! leaking files outside the tree being published.

pub mod path_validator;

pub use path_validator::{canonical_root, path_in_tree};
