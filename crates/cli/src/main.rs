//! `rustci` - GitHub Action entry point for rust-ci configuration.

mod cli;
mod commands;
mod host;
mod tracing;

use crate::cli::{Cli, Commands};
use crate::tracing::{TracingConfig, TracingFormat};

fn main() {
    let cli = match cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let Some(message) = cli::failure_message(&error) else {
                error.exit()
            };
            let _ = error.print();
            host::set_failed(&message);
            std::process::exit(1);
        }
    };

    if let Err(error) = run(cli) {
        host::set_failed(&error.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> miette::Result<()> {
    let format = if cli.json {
        TracingFormat::Json
    } else {
        TracingFormat::Compact
    };
    crate::tracing::init_tracing(TracingConfig {
        format,
        level: cli.level.into(),
    })?;

    match cli.command {
        Commands::Resolve {
            configs,
            execution_target,
            output,
        } => commands::resolve(&configs, execution_target.as_deref(), output.as_deref()),
        Commands::Schema { variant, output } => commands::schema(variant.into(), output.as_deref()),
    }
}
