//! cp and mv commands
//!
//! Both resolve their two templates against the same reference instant, so
//! `{DATEID-1}` in the source and `{DATEID}` in the destination always refer
//! to consecutive days.

use clap::Args;
use s3p_core::{PlanOptions, Verb, materialize};

use super::common::{self, Context, Request};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Arguments shared by cp and mv
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Source template (s3://bucket/key or s3://bucket/prefix/)
    pub source: String,

    /// Destination template; must be a prefix exactly when the source is
    pub destination: String,

    /// Skip keys ending with SUFFIX when expanding a prefix (repeatable)
    #[arg(long = "exclude", value_name = "SUFFIX")]
    pub excludes: Vec<String>,

    /// Print the plan without touching any object
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

pub async fn execute(
    verb: Verb,
    args: TransferArgs,
    ctx: &Context,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let paths = materialize(&args.source, &ctx.reference).and_then(|source| {
        materialize(&args.destination, &ctx.reference).map(|destination| (source, destination))
    });
    let (source, destination) = match paths {
        Ok(paths) => paths,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    let options = PlanOptions {
        excludes: merge_excludes(&ctx.config.defaults.excludes, args.excludes),
        limit: None,
    };

    common::plan_and_run(
        ctx,
        Request {
            verb,
            source: &source,
            destination: Some(&destination),
            options,
            dry_run: args.dry_run,
        },
        &formatter,
    )
    .await
}

/// Configured excludes first, then command-line ones, without duplicates
fn merge_excludes(configured: &[String], cli: Vec<String>) -> Vec<String> {
    let mut merged = configured.to_vec();
    for suffix in cli {
        if !merged.contains(&suffix) {
            merged.push(suffix);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_excludes() {
        let configured = vec!["_SUCCESS".to_string()];
        let merged = merge_excludes(
            &configured,
            vec![".tmp".to_string(), "_SUCCESS".to_string()],
        );
        assert_eq!(merged, ["_SUCCESS", ".tmp"]);
    }

    #[test]
    fn test_merge_excludes_empty() {
        assert!(merge_excludes(&[], Vec::new()).is_empty());
    }
}
