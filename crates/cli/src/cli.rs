use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use rustci_config::SchemaVariant;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rustci")]
#[command(about = "Resolve rust-ci workflow configuration into its canonical form")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: crate::tracing::LogLevel,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Resolve a configuration document and publish it as the `config` output")]
    Resolve {
        #[arg(
            long,
            env = "INPUT_CONFIGS",
            help = "Inline JSON document, or a path to one"
        )]
        configs: String,
        #[arg(
            long,
            env = "INPUT_EXECUTION_TARGET",
            help = "Runner used by jobs without their own os list"
        )]
        execution_target: Option<String>,
        #[arg(
            long,
            env = "GITHUB_OUTPUT",
            help = "File the output slot is appended to (stdout when unset)"
        )]
        output: Option<PathBuf>,
    },
    #[command(about = "Write the configuration JSON Schema")]
    Schema {
        #[arg(long, default_value = "partial", value_enum)]
        variant: Variant,
        #[arg(long, short = 'o', help = "Destination file (stdout when unset)")]
        output: Option<PathBuf>,
    },
}

/// Schema flavour selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Every top-level section optional; for editor validation
    Partial,
    /// Every top-level section required; what `resolve` enforces
    Strict,
}

impl From<Variant> for SchemaVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Partial => Self::Partial,
            Variant::Strict => Self::Strict,
        }
    }
}

pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}

/// Message for the failure channel, or `None` when clap is only printing
/// help or version text.
pub fn failure_message(error: &clap::Error) -> Option<String> {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => Some(error.to_string().trim_end().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_args() {
        let cli = Cli::try_parse_from([
            "rustci",
            "resolve",
            "--configs",
            "{}",
            "--execution-target",
            "ubuntu-latest",
        ])
        .unwrap();

        let Commands::Resolve {
            configs,
            execution_target,
            ..
        } = cli.command
        else {
            panic!("expected resolve");
        };
        assert_eq!(configs, "{}");
        assert_eq!(execution_target.as_deref(), Some("ubuntu-latest"));
    }

    #[test]
    fn test_resolve_reads_action_inputs_from_env() {
        temp_env::with_vars(
            [
                ("INPUT_CONFIGS", Some(".github/rust-ci.json")),
                ("INPUT_EXECUTION_TARGET", Some("vars.RUNNER_AMD64")),
                ("GITHUB_OUTPUT", Some("/tmp/github_output")),
            ],
            || {
                let cli = Cli::try_parse_from(["rustci", "resolve"]).unwrap();
                let Commands::Resolve {
                    configs,
                    execution_target,
                    output,
                } = cli.command
                else {
                    panic!("expected resolve");
                };
                assert_eq!(configs, ".github/rust-ci.json");
                assert_eq!(execution_target.as_deref(), Some("vars.RUNNER_AMD64"));
                assert_eq!(output, Some(PathBuf::from("/tmp/github_output")));
            },
        );
    }

    #[test]
    fn test_resolve_requires_configs() {
        temp_env::with_var_unset("INPUT_CONFIGS", || {
            assert!(Cli::try_parse_from(["rustci", "resolve"]).is_err());
        });
    }

    #[test]
    fn test_usage_errors_go_to_failure_channel() {
        temp_env::with_var_unset("INPUT_CONFIGS", || {
            let error = Cli::try_parse_from(["rustci", "resolve"]).unwrap_err();
            let message = failure_message(&error).unwrap();
            assert!(message.contains("--configs"), "{message}");
        });

        let error = Cli::try_parse_from(["rustci", "schema", "--variant", "loose"]).unwrap_err();
        assert!(failure_message(&error).is_some());
    }

    #[test]
    fn test_help_and_version_are_not_failures() {
        let error = Cli::try_parse_from(["rustci", "--help"]).unwrap_err();
        assert_eq!(failure_message(&error), None);

        let error = Cli::try_parse_from(["rustci", "--version"]).unwrap_err();
        assert_eq!(failure_message(&error), None);
    }

    #[test]
    fn test_schema_defaults_to_partial() {
        let cli = Cli::try_parse_from(["rustci", "schema"]).unwrap();
        let Commands::Schema { variant, output } = cli.command else {
            panic!("expected schema");
        };
        assert_eq!(variant, Variant::Partial);
        assert!(output.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rustci", "schema", "--json", "--level", "debug"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.level, crate::tracing::LogLevel::Debug));
    }
}
