//! flag command - Write a completion marker under a resolved prefix

use clap::Args;
use serde::Serialize;

use s3p_core::{ObjectStore as _, RemotePath, materialize};

use super::common::Context;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Args, Debug)]
pub struct FlagArgs {
    /// Prefix template the marker is written under
    pub prefix: String,

    /// Marker object name
    #[arg(long, default_value = "_SUCCESS")]
    pub name: String,

    /// Marker body
    #[arg(long, default_value = "")]
    pub content: String,
}

#[derive(Serialize)]
struct FlagOutput {
    path: String,
    size_bytes: usize,
    reference: String,
}

pub async fn execute(args: FlagArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match marker_path(&args.prefix, &args.name, ctx) {
        Ok(target) => target,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let client = match ctx.client().await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::NetworkError;
        }
    };

    let size_bytes = args.content.len();
    if let Err(e) = client.put_object(&target, args.content.into_bytes()).await {
        formatter.error(&format!("Failed to write {target}: {e}"));
        return ExitCode::from_error(&e);
    }

    if formatter.is_json() {
        formatter.json(&FlagOutput {
            path: target.to_string(),
            size_bytes,
            reference: ctx.reference_timestamp(),
        });
    } else {
        formatter.success(&format!("Wrote {}", formatter.style_path(&target.to_string())));
    }

    ExitCode::Success
}

fn marker_path(prefix: &str, name: &str, ctx: &Context) -> s3p_core::Result<RemotePath> {
    let resolved = materialize(prefix, &ctx.reference)?;
    if !resolved.is_prefix() {
        return Err(s3p_core::Error::InvalidPath(format!(
            "{resolved}: marker location must be a prefix ending with '/'"
        )));
    }
    if name.is_empty() || name.contains('/') {
        return Err(s3p_core::Error::InvalidPath(format!(
            "'{name}': marker name must be a single path segment"
        )));
    }
    Ok(resolved.remote()?.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::tz::TimeZone;
    use s3p_core::{Config, parse_reference};

    fn ctx() -> Context {
        Context {
            config: Config::default(),
            reference: parse_reference("2024-03-01T10:00:00Z", &TimeZone::UTC).unwrap(),
            parallel: 4,
        }
    }

    #[test]
    fn test_marker_path() {
        let path = marker_path("s3://bkt/out/{DATEID}/", "_SUCCESS", &ctx()).unwrap();
        assert_eq!(path.to_string(), "s3://bkt/out/2024-03-01/_SUCCESS");
    }

    #[test]
    fn test_marker_requires_prefix() {
        let err = marker_path("s3://bkt/out/{DATEID}", "_SUCCESS", &ctx()).unwrap_err();
        assert!(matches!(err, s3p_core::Error::InvalidPath(_)));
    }

    #[test]
    fn test_marker_name_is_one_segment() {
        assert!(marker_path("s3://bkt/out/", "a/b", &ctx()).is_err());
        assert!(marker_path("s3://bkt/out/", "", &ctx()).is_err());
    }
}
