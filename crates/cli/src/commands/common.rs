//! Shared command plumbing: configuration, reference instant, plan execution

use anyhow::Context as _;
use jiff::Zoned;
use serde::Serialize;

use s3p_core::{
    CancelFlag, Config, ConfigManager, ExecutionReport, ExecutionResult, Executor, ObjectAction,
    OperationPlan, PlanOptions, ResolvedPath, Verb, parse_reference, parse_timezone,
    reference_now,
};
use s3p_s3::S3Client;

use super::GlobalArgs;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Everything a command needs besides its own arguments
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    /// Instant every placeholder in this invocation resolves against
    pub reference: Zoned,
    pub parallel: usize,
}

impl Context {
    pub fn load(args: &GlobalArgs) -> s3p_core::Result<Self> {
        let config = ConfigManager::new()?.load()?;

        let tz_name = args.tz.as_deref().unwrap_or(config.defaults.timezone.as_str());
        let tz = parse_timezone(tz_name)?;
        let reference = match args.at.as_deref() {
            Some(text) => parse_reference(text, &tz)?,
            None => reference_now(&tz),
        };
        let parallel = args.parallel.unwrap_or(config.defaults.parallel);

        tracing::debug!(reference = %reference, parallel, "Loaded context");

        Ok(Self {
            config,
            reference,
            parallel,
        })
    }

    /// Reference instant as an RFC 3339 UTC timestamp
    pub fn reference_timestamp(&self) -> String {
        self.reference.timestamp().to_string()
    }

    pub async fn client(&self) -> anyhow::Result<S3Client> {
        S3Client::new(&self.config.store, self.config.retry.clone())
            .await
            .context("Failed to create S3 client")
    }
}

/// Raise a cancel flag on the first Ctrl-C
pub fn cancel_on_interrupt() -> CancelFlag {
    let flag = CancelFlag::new();
    let handle = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, letting in-flight requests finish");
            handle.cancel();
        }
    });
    flag
}

/// A cp/mv/rm invocation after template materialization
pub struct Request<'a> {
    pub verb: Verb,
    pub source: &'a ResolvedPath,
    pub destination: Option<&'a ResolvedPath>,
    pub options: PlanOptions,
    pub dry_run: bool,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    verb: Verb,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<&'a str>,
    reference: String,
    dry_run: bool,
    actions: &'a [ObjectAction],
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    verb: Verb,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<&'a str>,
    reference: String,
    succeeded: usize,
    failed: usize,
    results: &'a [ExecutionResult],
}

/// Plan a request and, unless it is a dry run, execute it
pub async fn plan_and_run(ctx: &Context, request: Request<'_>, formatter: &Formatter) -> ExitCode {
    if let Err(e) = s3p_core::validate(request.verb, request.source, request.destination) {
        formatter.error(&e.to_string());
        return ExitCode::from_error(&e);
    }

    let client = match ctx.client().await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::NetworkError;
        }
    };

    let plan = match s3p_core::plan(
        &client,
        request.verb,
        request.source,
        request.destination,
        &request.options,
    )
    .await
    {
        Ok(plan) => plan,
        Err(e) => {
            formatter.error(&format!("Failed to plan {}: {e}", request.verb));
            return ExitCode::from_error(&e);
        }
    };

    if request.dry_run {
        print_plan(ctx, &request, &plan, formatter);
        return ExitCode::Success;
    }

    let report = Executor::new(&client)
        .with_concurrency(ctx.parallel)
        .with_cancel(cancel_on_interrupt())
        .execute(plan)
        .await;

    print_report(ctx, &request, &report, formatter);

    if report.was_cancelled() {
        ExitCode::Interrupted
    } else if report.is_success() {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}

fn print_plan(ctx: &Context, request: &Request<'_>, plan: &OperationPlan, formatter: &Formatter) {
    if formatter.is_json() {
        formatter.json(&PlanOutput {
            verb: request.verb,
            source: request.source.literal(),
            destination: request.destination.map(ResolvedPath::literal),
            reference: ctx.reference_timestamp(),
            dry_run: true,
            actions: &plan.actions,
        });
        return;
    }

    for action in &plan.actions {
        formatter.println(&format!(
            "{} {}",
            formatter.style_name(action.verb.as_str()),
            describe(action, formatter)
        ));
    }
    formatter.println(&format!(
        "{} action(s) planned (dry run)",
        formatter.style_size(&plan.len().to_string())
    ));
}

fn print_report(
    ctx: &Context,
    request: &Request<'_>,
    report: &ExecutionReport,
    formatter: &Formatter,
) {
    if formatter.is_json() {
        formatter.json(&ReportOutput {
            verb: request.verb,
            source: request.source.literal(),
            destination: request.destination.map(ResolvedPath::literal),
            reference: ctx.reference_timestamp(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            results: &report.results,
        });
        return;
    }

    for result in &report.results {
        if result.succeeded {
            formatter.success(&describe(&result.action, formatter));
        } else {
            formatter.failure(&format!(
                "{}: {}",
                describe(&result.action, formatter),
                result.message.as_deref().unwrap_or("failed")
            ));
        }
    }

    if report.was_cancelled() {
        formatter.warning("Interrupted; remaining actions were not started");
    }
    formatter.println(&format!(
        "{}: {} succeeded, {} failed",
        request.verb,
        report.succeeded(),
        report.failed()
    ));
}

/// `src -> dst` for transfers, `src` otherwise
fn describe(action: &ObjectAction, formatter: &Formatter) -> String {
    match &action.destination {
        Some(dst) => format!(
            "{} -> {}",
            formatter.style_path(&action.source.to_string()),
            formatter.style_path(&dst.to_string())
        ),
        None => formatter.style_path(&action.source.to_string()),
    }
}
