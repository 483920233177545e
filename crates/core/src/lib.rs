//! s3p-core: date-templated store paths and the operations run on them
//!
//! This crate provides:
//! - The `{DATEID}` / `{DATETIMEID}` placeholder grammar and parser
//! - Date resolution against an explicit reference instant
//! - Path materialization and store path parsing
//! - Operation planning (cp/mv/rm/ls) and best-effort execution
//! - The ObjectStore trait, configuration and transport retry helpers
//!
//! Nothing here depends on an S3 SDK; adapters implement [`ObjectStore`].

pub mod config;
pub mod error;
pub mod execute;
pub mod path;
pub mod plan;
pub mod resolve;
pub mod retry;
pub mod template;
pub mod token;
pub mod traits;

pub use config::{Config, ConfigManager, Defaults, RetryConfig, StoreConfig};
pub use error::{Error, Result};
pub use execute::{CancelFlag, ErrorKind, ExecutionReport, ExecutionResult, Executor};
pub use path::RemotePath;
pub use plan::{ObjectAction, OperationPlan, PlanOptions, Verb, plan, validate};
pub use resolve::{parse_reference, parse_timezone, reference_now, resolve};
pub use retry::{is_retryable_error, retry_with_backoff};
pub use template::{ResolvedPath, materialize};
pub use token::{Token, TokenKind, parse};
pub use traits::{ListOptions, ObjectInfo, ObjectStore, lookup_object};
