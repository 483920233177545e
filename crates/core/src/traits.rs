//! Object store abstraction
//!
//! The planner and executor only ever talk to this trait. Adapters own
//! pagination and transport retry.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::RemotePath;

/// Metadata for one listed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Full object key
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl ObjectInfo {
    /// Create info for an object with a known size
    pub fn file(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            last_modified: None,
            etag: None,
            owner: None,
        }
    }
}

/// Options for listing
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Stop after this many objects
    pub limit: Option<usize>,
    /// Keys requested per page (adapter default when unset)
    pub page_size: Option<i32>,
}

/// Operations s3p needs from an object store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every object whose key starts with `path.key`, in key order
    async fn list_objects(&self, path: &RemotePath, options: ListOptions)
    -> Result<Vec<ObjectInfo>>;

    /// Server-side copy of one object
    async fn copy_object(&self, src: &RemotePath, dst: &RemotePath) -> Result<()>;

    async fn delete_object(&self, path: &RemotePath) -> Result<()>;

    /// Write a small object (marker files)
    async fn put_object(&self, path: &RemotePath, body: Vec<u8>) -> Result<()>;
}

/// Metadata for exactly `path.key`
///
/// Lists with the key as prefix and a limit of one: in key order the key
/// itself sorts before anything it prefixes, so a different first key means
/// the object does not exist.
pub async fn lookup_object(store: &dyn ObjectStore, path: &RemotePath) -> Result<ObjectInfo> {
    let options = ListOptions {
        limit: Some(1),
        page_size: Some(1),
    };
    store
        .list_objects(path, options)
        .await?
        .into_iter()
        .next()
        .filter(|info| info.key == path.key)
        .ok_or_else(|| Error::NotFound(path.to_string()))
}
