use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_ORDER, DEFAULT_RESULT_PATH};

/// Dense integer matrix multiplication benchmark
///
/// Multiplies two n×n matrices on one of four concurrency substrates and
/// reports the time spent in the multiplication alone.
#[derive(Parser, Debug)]
#[command(name = "matbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Multiply on the calling thread
    Sequential {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Multiply with one OS thread per row block
    Threads {
        #[command(flatten)]
        common: CommonArgs,

        /// Use twice as many threads as available CPUs
        #[arg(long = "doublethreads")]
        double_threads: bool,
    },

    /// Multiply with one forked process per row block over shared memory
    Processes {
        #[command(flatten)]
        common: CommonArgs,

        /// Use twice as many processes as available CPUs
        #[arg(long = "doublethreads")]
        double_threads: bool,
    },

    /// Multiply with a data-parallel loop on a runtime thread team
    DataParallel {
        #[command(flatten)]
        common: CommonArgs,

        /// Team size (defaults to the number of available CPUs)
        #[arg(long, value_name = "N")]
        threads: Option<usize>,
    },

    /// Write a random matrix with values in 0..=9 to a file
    Generate {
        /// Matrix order
        #[arg(value_name = "N")]
        order: usize,

        /// Output file
        #[arg(value_name = "FILE")]
        output: PathBuf,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Options shared by every benchmark subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Matrix order
    #[arg(value_name = "N", default_value_t = DEFAULT_ORDER)]
    pub order: usize,

    /// Read operands A and B from files instead of generating them
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pub files: Option<Vec<PathBuf>>,

    /// Where to write the result matrix
    #[arg(long, value_name = "FILE", default_value = DEFAULT_RESULT_PATH)]
    pub result: PathBuf,

    /// Use the transpose-access kernel
    #[arg(long)]
    pub transpose: bool,

    /// Seed for generated operands
    #[arg(long)]
    pub seed: Option<u64>,
}
