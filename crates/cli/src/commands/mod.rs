//! Command definitions and dispatch

mod common;
mod completions;
mod flag;
mod ls;
mod resolve;
mod rm;
mod transfer;

use clap::{Args, Parser, Subcommand};
use s3p_core::Verb;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub use common::Context;

/// Run cp/mv/rm/ls against date-templated S3 paths
///
/// Paths may contain one placeholder: {DATEID}, {DATETIMEID}, or either
/// with a whole-day offset such as {DATEID-1} or {DATETIMEID+7}.
#[derive(Parser, Debug)]
#[command(name = "s3p", version, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Output JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Reference instant placeholders resolve against (default: now).
    /// Accepts 2024-03-01T00:00:00Z, 2024-03-01T00:00:00 or 2024-03-01
    #[arg(long, global = true, env = "S3P_AT", value_name = "INSTANT")]
    pub at: Option<String>,

    /// Time zone for the reference instant (default: config, then UTC)
    #[arg(long, global = true, env = "S3P_TZ", value_name = "ZONE")]
    pub tz: Option<String>,

    /// Number of object operations run concurrently
    #[arg(
        short = 'P',
        long,
        global = true,
        value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub parallel: Option<usize>,
}

impl GlobalArgs {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            json: self.json,
            no_color: self.no_color,
            quiet: self.quiet,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy objects from a source template to a destination template
    Cp(transfer::TransferArgs),

    /// Move objects (copy, then remove each source that copied)
    Mv(transfer::TransferArgs),

    /// Remove objects
    Rm(rm::RmArgs),

    /// List objects
    Ls(ls::LsArgs),

    /// Print templates with their placeholders resolved
    Resolve(resolve::ResolveArgs),

    /// Write a marker object (e.g. _SUCCESS) under a prefix
    Flag(flag::FlagArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the parsed command line
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = cli.global.output_config();

    if let Commands::Completions(args) = &cli.command {
        return completions::execute(args);
    }

    let ctx = match Context::load(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => {
            Formatter::new(output_config).error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    match cli.command {
        Commands::Cp(args) => transfer::execute(Verb::Copy, args, &ctx, output_config).await,
        Commands::Mv(args) => transfer::execute(Verb::Move, args, &ctx, output_config).await,
        Commands::Rm(args) => rm::execute(args, &ctx, output_config).await,
        Commands::Ls(args) => ls::execute(args, &ctx, output_config).await,
        Commands::Resolve(args) => resolve::execute(args, &ctx, output_config),
        Commands::Flag(args) => flag::execute(args, &ctx, output_config).await,
        Commands::Completions(args) => completions::execute(&args),
    }
}
