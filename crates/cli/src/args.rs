//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse policy and encoding flags into library types.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `commands` module).

use clap::{Parser, Subcommand, ValueEnum};
use envcraft::{Encoding, LookupPolicy, MissingPolicy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "envcraft-cli")]
#[command(about = "Inspect .env files and environment variable names", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  envcraft-cli expand .env\n  envcraft-cli expand .env --missing leave --output json\n  envcraft-cli key databaseUrl apiKey --prefix APP_\n"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Expand $NAME and ${NAME} references in an env file and print the result
    Expand {
        /// Path to the env file. A missing file expands to nothing.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// What to do with references nothing can resolve (error, leave, empty)
        #[arg(
            long,
            env = "ENVCRAFT_MISSING",
            default_value = "error",
            value_parser = parse_missing
        )]
        missing: MissingPolicy,

        /// Where references are looked up (env-first, file-first, file-only, env-only)
        #[arg(
            long,
            env = "ENVCRAFT_LOOKUP",
            default_value = "env-first",
            value_parser = parse_lookup
        )]
        lookup: LookupPolicy,

        /// Text encoding of the env file (utf8, utf8-lossy, latin1)
        #[arg(long, default_value = "utf8", value_parser = parse_encoding)]
        encoding: Encoding,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Dotenv)]
        output: OutputFormat,
    },

    /// Print the environment variable name each schema key is looked up under
    Key {
        /// Schema keys, e.g. databaseUrl
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,

        /// Prefix prepended to every variable name
        #[arg(long, default_value = "")]
        prefix: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// KEY=value lines
    Dotenv,
    /// A JSON object
    Json,
}

fn parse_missing(s: &str) -> Result<MissingPolicy, String> {
    s.parse()
}

fn parse_lookup(s: &str) -> Result<LookupPolicy, String> {
    s.parse()
}

fn parse_encoding(s: &str) -> Result<Encoding, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_expand_defaults() {
        let cli = Cli::try_parse_from(["envcraft-cli", "expand", ".env"]).unwrap();
        match cli.command {
            Commands::Expand {
                file,
                missing,
                lookup,
                encoding,
                output,
            } => {
                assert_eq!(file, PathBuf::from(".env"));
                assert_eq!(missing, MissingPolicy::Error);
                assert_eq!(lookup, LookupPolicy::EnvFirst);
                assert_eq!(encoding, Encoding::Utf8);
                assert_eq!(output, OutputFormat::Dotenv);
            }
            Commands::Key { .. } => panic!("expected expand"),
        }
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let result =
            Cli::try_parse_from(["envcraft-cli", "expand", ".env", "--missing", "ignore"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_key_requires_names() {
        assert!(Cli::try_parse_from(["envcraft-cli", "key"]).is_err());
    }
}
