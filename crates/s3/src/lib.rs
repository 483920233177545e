//! s3p-s3: S3 SDK adapter for s3p
//!
//! This crate implements the `ObjectStore` trait from s3p-core on top of
//! aws-sdk-s3. It is the only crate in the workspace that talks to S3.

pub mod client;

pub use client::S3Client;
