//! resolve command - Show what templates expand to without touching the store

use clap::Args;
use serde::Serialize;

use s3p_core::{TokenKind, materialize, parse};

use super::common::Context;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Templates to resolve
    #[arg(required = true)]
    pub templates: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResolvedEntry {
    template: String,
    literal: String,
    is_prefix: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<TokenKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset_days: Option<i64>,
}

#[derive(Serialize)]
struct ResolveOutput {
    reference: String,
    paths: Vec<ResolvedEntry>,
}

pub fn execute(args: ResolveArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let mut paths = Vec::with_capacity(args.templates.len());
    for template in args.templates {
        match resolve_one(&template, ctx) {
            Ok(entry) => paths.push(entry),
            Err(e) => {
                formatter.error(&e.to_string());
                return ExitCode::from_error(&e);
            }
        }
    }

    if formatter.is_json() {
        formatter.json(&ResolveOutput {
            reference: ctx.reference_timestamp(),
            paths,
        });
    } else {
        for entry in &paths {
            formatter.println(&formatter.style_path(&entry.literal));
        }
    }

    ExitCode::Success
}

fn resolve_one(template: &str, ctx: &Context) -> s3p_core::Result<ResolvedEntry> {
    let token = parse(template)?;
    let resolved = materialize(template, &ctx.reference)?;

    Ok(ResolvedEntry {
        template: template.to_string(),
        literal: resolved.literal().to_string(),
        is_prefix: resolved.is_prefix(),
        kind: token.as_ref().map(|t| t.kind),
        offset_days: token.map(|t| t.offset_days),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::tz::TimeZone;
    use s3p_core::{Config, parse_reference};

    fn ctx(at: &str) -> Context {
        Context {
            config: Config::default(),
            reference: parse_reference(at, &TimeZone::UTC).unwrap(),
            parallel: 4,
        }
    }

    #[test]
    fn test_resolve_with_offset() {
        let entry = resolve_one("s3://bkt/in/{DATEID-1}/", &ctx("2024-03-01T00:00:00Z")).unwrap();
        assert_eq!(entry.literal, "s3://bkt/in/2024-02-29/");
        assert!(entry.is_prefix);
        assert_eq!(entry.kind, Some(TokenKind::DateId));
        assert_eq!(entry.offset_days, Some(-1));
    }

    #[test]
    fn test_resolve_literal_template() {
        let entry = resolve_one("s3://bkt/static/file.csv", &ctx("2024-03-01")).unwrap();
        assert_eq!(entry.literal, "s3://bkt/static/file.csv");
        assert_eq!(entry.kind, None);
        assert_eq!(entry.offset_days, None);
    }

    #[test]
    fn test_resolve_malformed_is_usage_error() {
        let err = resolve_one("s3://bkt/{DATE}/", &ctx("2024-03-01")).unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::UsageError);
    }
}
