//! rm command - Remove one object or everything under a prefix

use clap::Args;
use s3p_core::{PlanOptions, Verb, materialize};

use super::common::{self, Context, Request};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object or prefix template to remove
    pub path: String,

    /// Required to remove every object under a prefix
    #[arg(short, long)]
    pub recursive: bool,

    /// Print the plan without removing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

pub async fn execute(args: RmArgs, ctx: &Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let source = match materialize(&args.path, &ctx.reference) {
        Ok(source) => source,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    if source.is_prefix() && !args.recursive {
        formatter.error(&format!(
            "{source} is a prefix; pass --recursive to remove everything under it"
        ));
        return ExitCode::UsageError;
    }

    common::plan_and_run(
        ctx,
        Request {
            verb: Verb::Remove,
            source: &source,
            destination: None,
            options: PlanOptions::default(),
            dry_run: args.dry_run,
        },
        &formatter,
    )
    .await
}
