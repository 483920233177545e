//! Store path parsing
//!
//! Resolved templates are URIs of the form `s3://bucket/key`. The key is
//! normalized so that repeated slashes collapse to one; a trailing slash is
//! kept because it marks a prefix.

use serde::Serialize;

use crate::error::{Error, Result};

/// URI schemes accepted for store paths
pub const SCHEMES: &[&str] = &["s3", "s3a", "s3n", "store"];

/// A bucket plus object key (or key prefix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemotePath {
    pub bucket: String,
    pub key: String,
}

impl RemotePath {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse `scheme://bucket[/key]`
    pub fn parse(uri: &str) -> Result<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| Error::InvalidPath(format!("{uri}: expected scheme://bucket/key")))?;

        if !SCHEMES.contains(&scheme) {
            return Err(Error::InvalidPath(format!(
                "{uri}: unsupported scheme '{scheme}' (expected one of {})",
                SCHEMES.join(", ")
            )));
        }

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidPath(format!("{uri}: bucket name is empty")));
        }

        Ok(Self::new(bucket, normalize_key(key)))
    }

    /// Whether the key names a "directory" rather than one object
    pub fn is_prefix(&self) -> bool {
        self.key.is_empty() || self.key.ends_with('/')
    }

    /// Append a key relative to this prefix
    pub fn join(&self, relative: &str) -> Self {
        let relative = relative.trim_start_matches('/');
        let key = if self.key.is_empty() || self.key.ends_with('/') {
            format!("{}{relative}", self.key)
        } else {
            format!("{}/{relative}", self.key)
        };
        Self::new(&self.bucket, key)
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Collapse runs of `/` and drop a leading one
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_slash = true;
    for c in key.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    out
}
