//! Command-line entry point for patch-evaluation reporting.

mod args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sweval_report::{
    final_report, model_eval_summary, model_report, write_final_report, HarnessLogParser,
};

use crate::args::{Args, Command};

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "sweval=debug,sweval_report=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<()> {
    match &args.command {
        Command::Report(report_args) => {
            // Logs for one model live under a subdirectory named after it.
            let log_dir = report_args.logs.join(&report_args.model);
            let report_map = model_report(
                &HarnessLogParser,
                &report_args.model,
                &report_args.predictions,
                &report_args.task_file,
                &log_dir,
            )
            .with_context(|| format!("failed to build report for model {}", report_args.model))?;

            let report = final_report(&report_map);
            let none: usize = report_map.values().map(|funnel| funnel.none.len()).sum();

            println!("{} Evaluation Report:", report_args.model);
            println!("\tNone:      {}", none);
            println!("\tGenerated: {}", report.stats.generated);
            println!("\tWith Logs: {}", report.stats.with_logs);
            println!("\tApplied:   {}", report.stats.applied);
            println!("\tResolved:  {}", report.stats.resolved);

            for (project, resolved) in &report.resolved_per_project {
                println!("{} resolved ({}): {:?}", project, resolved.len(), resolved);
            }

            write_final_report(&report, &report_args.out).with_context(|| {
                format!("failed to write report to {}", report_args.out.display())
            })?;
        }
        Command::Summary(summary_args) => {
            let summary = model_eval_summary(
                &HarnessLogParser,
                &summary_args.predictions,
                &summary_args.logs,
                &summary_args.task_file,
                summary_args.repo.as_deref(),
            )
            .context("failed to build model summary")?;

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
