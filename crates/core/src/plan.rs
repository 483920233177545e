//! Operation planning
//!
//! Expands resolved source/destination paths into one action per object.
//! Shape and argument checks run before the store is contacted; the only
//! store call made here is the listing of a prefix source.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::RemotePath;
use crate::template::ResolvedPath;
use crate::traits::{ListOptions, ObjectInfo, ObjectStore};

/// What to do with the matched objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Copy,
    Move,
    Remove,
    List,
}

impl Verb {
    /// Whether the verb needs a destination path
    pub fn needs_destination(&self) -> bool {
        matches!(self, Verb::Copy | Verb::Move)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Copy => "copy",
            Verb::Move => "move",
            Verb::Remove => "remove",
            Verb::List => "list",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One per-object step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectAction {
    pub verb: Verb,
    pub source: RemotePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<RemotePath>,
    /// Listing metadata, present when the source came from a prefix listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<ObjectInfo>,
}

/// Ordered actions for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationPlan {
    pub verb: Verb,
    pub actions: Vec<ObjectAction>,
}

impl OperationPlan {
    pub fn empty(verb: Verb) -> Self {
        Self {
            verb,
            actions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Planner knobs
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Key suffixes skipped when expanding a prefix for copy/move
    pub excludes: Vec<String>,
    /// Maximum number of keys taken from a prefix listing
    pub limit: Option<usize>,
}

/// Check verb arguments and source/destination shapes without any I/O
///
/// Returns the parsed source and destination.
pub fn validate(
    verb: Verb,
    source: &ResolvedPath,
    destination: Option<&ResolvedPath>,
) -> Result<(RemotePath, Option<RemotePath>)> {
    let destination = match (verb.needs_destination(), destination) {
        (true, Some(dst)) => Some(dst),
        (true, None) => {
            return Err(Error::InvalidPlan(format!("{verb} requires a destination")));
        }
        (false, Some(dst)) => {
            return Err(Error::InvalidPlan(format!(
                "{verb} takes no destination (got '{dst}')"
            )));
        }
        (false, None) => None,
    };

    if let Some(dst) = destination
        && source.is_prefix() != dst.is_prefix()
    {
        let shape = |p: &ResolvedPath| if p.is_prefix() { "a prefix" } else { "a single key" };
        return Err(Error::AmbiguousDestination(format!(
            "source '{source}' is {} but destination '{dst}' is {}",
            shape(source),
            shape(dst)
        )));
    }

    let src = source.remote()?;
    if !source.is_prefix() && src.key.is_empty() {
        return Err(Error::InvalidPath(format!("{source}: object key is empty")));
    }
    let dst = destination.map(ResolvedPath::remote).transpose()?;
    if let Some((path, remote)) = destination.zip(dst.as_ref())
        && !path.is_prefix()
        && remote.key.is_empty()
    {
        return Err(Error::InvalidPath(format!("{path}: object key is empty")));
    }

    if let Some(dst) = &dst
        && overlaps(&src, dst)
    {
        return Err(Error::InvalidPlan(format!(
            "{src} and {dst} overlap; {verb} would overwrite objects it has not read yet"
        )));
    }

    Ok((src, dst))
}

/// Distinct prefixes in one bucket where one contains the other
///
/// Identical paths are not an overlap; the planner turns them into a no-op.
fn overlaps(src: &RemotePath, dst: &RemotePath) -> bool {
    src.bucket == dst.bucket
        && src.is_prefix()
        && dst.is_prefix()
        && src.key != dst.key
        && (dst.key.starts_with(&src.key) || src.key.starts_with(&dst.key))
}

/// Build the plan for `verb`
pub async fn plan(
    store: &dyn ObjectStore,
    verb: Verb,
    source: &ResolvedPath,
    destination: Option<&ResolvedPath>,
    options: &PlanOptions,
) -> Result<OperationPlan> {
    let (src, dst) = validate(verb, source, destination)?;

    if dst.as_ref() == Some(&src) {
        tracing::warn!(path = %src, "Source and destination are identical, nothing to do");
        return Ok(OperationPlan::empty(verb));
    }

    if !source.is_prefix() {
        return Ok(OperationPlan {
            verb,
            actions: vec![ObjectAction {
                verb,
                source: src,
                destination: dst,
                info: None,
            }],
        });
    }

    let listed = store
        .list_objects(
            &src,
            ListOptions {
                limit: options.limit,
                ..Default::default()
            },
        )
        .await?;

    let mut actions = Vec::with_capacity(listed.len());
    for info in listed {
        let Some(relative) = info.key.strip_prefix(&src.key) else {
            tracing::warn!(key = %info.key, prefix = %src.key, "Listed key outside prefix, skipping");
            continue;
        };

        if verb.needs_destination()
            && options
                .excludes
                .iter()
                .any(|suffix| info.key.ends_with(suffix.as_str()))
        {
            tracing::debug!(key = %info.key, "Excluded by suffix");
            continue;
        }

        let destination = dst.as_ref().map(|d| d.join(relative));
        actions.push(ObjectAction {
            verb,
            source: RemotePath::new(&src.bucket, &info.key),
            destination,
            info: Some(info),
        });
    }

    tracing::debug!(%verb, prefix = %src, actions = actions.len(), "Planned prefix operation");

    Ok(OperationPlan { verb, actions })
}
