//! s3p - date-templated S3 operations
//!
//! Resolves `{DATEID}` / `{DATETIMEID}` placeholders in S3 paths and runs
//! cp, mv, rm or ls against the matching objects.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod exit_code;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --debug wins over RUST_LOG for our own crates
    let filter = if cli.global.debug {
        EnvFilter::new("s3p=debug,s3p_core=debug,s3p_s3=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
