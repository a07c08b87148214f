//! Table discovery operations for DynamoDB.
//!
//! This module provides:
//! - `list` - Merge regional and global table listings into one sorted set

mod list;

// Re-export public items
pub use list::{TableDescriptor, list_combined_tables};
