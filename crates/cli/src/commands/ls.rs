//! ls command - List objects under a resolved prefix
//!
//! A single key is looked up exactly; a missing key exits with not-found.

use clap::Args;
use serde::Serialize;

use s3p_core::{ObjectInfo, OperationPlan, PlanOptions, Verb, lookup_object, materialize};

use super::common::Context;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

const DEFAULT_LIMIT: usize = 1000;

#[derive(Args, Debug)]
pub struct LsArgs {
    /// Prefix or object template to list
    pub path: String,

    /// Stop after this many objects
    #[arg(
        long,
        default_value_t = DEFAULT_LIMIT,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub limit: usize,
}

#[derive(Serialize)]
struct LsOutput<'a> {
    path: &'a str,
    reference: String,
    objects: Vec<ObjectInfo>,
    truncated: bool,
}

pub async fn execute(args: LsArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let source = match materialize(&args.path, &ctx.reference) {
        Ok(source) => source,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };
    let remote = match s3p_core::validate(Verb::List, &source, None) {
        Ok((remote, _)) => remote,
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

    let objects = if source.is_prefix() {
        let options = PlanOptions {
            excludes: Vec::new(),
            limit: Some(args.limit),
        };
        match s3p_core::plan(&client, Verb::List, &source, None, &options).await {
            Ok(plan) => objects(plan),
            Err(e) => {
                formatter.error(&format!("Failed to list {source}: {e}"));
                return ExitCode::from_error(&e);
            }
        }
    } else {
        match lookup_object(&client, &remote).await {
            Ok(info) => vec![info],
            Err(e) => {
                formatter.error(&format!("Failed to list {source}: {e}"));
                return ExitCode::from_error(&e);
            }
        }
    };
    let truncated = source.is_prefix() && objects.len() >= args.limit;

    if formatter.is_json() {
        formatter.json(&LsOutput {
            path: source.literal(),
            reference: ctx.reference_timestamp(),
            objects,
            truncated,
        });
        return ExitCode::Success;
    }

    for object in &objects {
        formatter.println(&format_line(object, &formatter));
    }
    if truncated {
        formatter.warning(&format!(
            "Stopped after {} objects; raise --limit to see more",
            args.limit
        ));
    }

    ExitCode::Success
}

/// Listed objects in plan order
fn objects(plan: OperationPlan) -> Vec<ObjectInfo> {
    plan.actions
        .into_iter()
        .filter_map(|action| action.info)
        .collect()
}

fn format_line(object: &ObjectInfo, formatter: &Formatter) -> String {
    let date = object
        .last_modified
        .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    let size = object.size_bytes.map(format_size).unwrap_or_default();

    format!(
        "[{}] {:>10} {}",
        formatter.style_date(&format!("{date:19}")),
        formatter.style_size(&size),
        formatter.style_path(&object.key)
    )
}

fn format_size(size: i64) -> String {
    humansize::format_size(size.max(0) as u64, humansize::BINARY)
}
