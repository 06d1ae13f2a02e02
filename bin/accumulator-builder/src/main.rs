#![warn(clippy::unwrap_used)]
#![warn(clippy::uninlined_format_args)]

mod build;
mod cli;
mod inspect;

use clap::Parser;
use portal_utils::{dir::setup_data_dir, log::init_tracing_logger};
use tracing::info;

use crate::cli::{BuilderConfig, BuilderSubCommands, APP_NAME};

fn main() -> anyhow::Result<()> {
    init_tracing_logger();
    let config = BuilderConfig::parse();
    info!("Running accumulator builder with configuration: {config:?}");
    match config.command {
        BuilderSubCommands::Build(build_config) => {
            let output_dir = setup_data_dir(APP_NAME, build_config.output_dir, false)?;
            let summary = build::build_accumulators(&build_config.headers, &output_dir)?;
            info!(
                root = %summary.root,
                headers = summary.header_count,
                epochs = summary.epoch_count,
                "Wrote accumulators to {output_dir:?}"
            );
        }
        BuilderSubCommands::Inspect(inspect_config) => {
            let report = inspect::inspect_accumulator(
                &inspect_config.accumulator,
                inspect_config.expected_root,
            )?;
            info!("{report}");
        }
    }
    Ok(())
}
