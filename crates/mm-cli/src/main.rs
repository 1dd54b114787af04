//! matbench - dense integer matrix multiplication benchmark.
//!
//! # Commands
//!
//! - `sequential` - Multiply on the calling thread
//! - `threads` - One OS thread per row block
//! - `processes` - One forked process per row block over shared memory
//! - `data-parallel` - A data-parallel loop on a runtime thread team
//! - `generate` - Write a random matrix file

mod cli;
mod config;
mod run;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use mm_exec::{ExecError, Substrate};
use mm_matrix::{ErrorKind, MatrixError};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, Commands};
use crate::config::{RunConfig, WorkerRequest};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }

    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match error_kind(&e) {
                Some(kind) => error!(%kind, "{e:#}"),
                None => error!("{e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands) -> Result<()> {
    let config = match command {
        Commands::Sequential { common } => {
            RunConfig::resolve(Substrate::Sequential, &common, WorkerRequest::Exact(1))?
        }
        Commands::Threads {
            common,
            double_threads,
        } => RunConfig::resolve(
            Substrate::Threads,
            &common,
            WorkerRequest::PerCpu {
                doubled: double_threads,
            },
        )?,
        Commands::Processes {
            common,
            double_threads,
        } => RunConfig::resolve(
            Substrate::Processes,
            &common,
            WorkerRequest::PerCpu {
                doubled: double_threads,
            },
        )?,
        Commands::DataParallel { common, threads } => {
            let request = match threads {
                Some(n) => WorkerRequest::Exact(n),
                None => WorkerRequest::PerCpu { doubled: false },
            };
            RunConfig::resolve(Substrate::DataParallel, &common, request)?
        }
        Commands::Generate {
            order,
            output,
            seed,
        } => return run::generate(order, &output, seed),
    };

    run::run_benchmark(&config)
}

/// Classify a failure for the diagnostic line.
fn error_kind(e: &anyhow::Error) -> Option<ErrorKind> {
    e.chain().find_map(|cause| {
        cause
            .downcast_ref::<ExecError>()
            .map(ExecError::kind)
            .or_else(|| cause.downcast_ref::<MatrixError>().map(MatrixError::kind))
    })
}
