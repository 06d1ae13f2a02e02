use std::path::PathBuf;

use alloy_primitives::B256;
use clap::{Args, Parser, Subcommand};

pub const APP_NAME: &str = "accumulator-builder";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Accumulator Builder",
    about = "Build and inspect pre-merge accumulator artifacts"
)]
pub struct BuilderConfig {
    #[command(subcommand)]
    pub command: BuilderSubCommands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum BuilderSubCommands {
    /// Folds a file of headers into the pre-merge accumulator and its epoch accumulators
    Build(BuildConfig),
    /// Prints a summary of an accumulator, optionally checking its root
    Inspect(InspectConfig),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct BuildConfig {
    #[arg(
        long,
        help = "File with one 0x-prefixed, hex encoded RLP header per line, starting from genesis"
    )]
    pub headers: PathBuf,

    #[arg(
        long,
        help = "Directory where the accumulators are written. Defaults to the OS data directory"
    )]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct InspectConfig {
    #[arg(long, help = "Path to an SSZ encoded pre-merge accumulator")]
    pub accumulator: PathBuf,

    #[arg(long, help = "Root the accumulator is expected to hash to")]
    pub expected_root: Option<B256>,
}
