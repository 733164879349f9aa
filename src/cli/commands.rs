//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Finite State platform CLI
#[derive(Parser, Debug)]
#[command(name = "finite-state")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    pub output_format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a bearer token for the configured credentials
    Token,

    /// Run a paginated GraphQL query and print every record
    Query {
        /// File containing the query text
        #[arg(long)]
        file: PathBuf,

        /// Result field the records are listed under
        #[arg(long)]
        field: String,

        /// Inline variables JSON
        #[arg(long)]
        variables: Option<String>,
    },

    /// Run a built-in list query
    List {
        /// Template name (artifacts, assets, findings, ...)
        resource: String,

        /// Restrict to one object id
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        business_unit: Option<String>,

        #[arg(long)]
        asset_version: Option<String>,

        #[arg(long)]
        product: Option<String>,

        /// Finding category
        #[arg(long)]
        category: Option<String>,

        /// Software component type
        #[arg(long = "type")]
        component_type: Option<String>,
    },

    /// Upload a binary for analysis to an existing test
    UploadBinary {
        #[arg(long)]
        test_id: String,

        #[arg(long)]
        file: PathBuf,

        /// Part size in bytes (defaults to the configured chunk size)
        #[arg(long)]
        chunk_size: Option<u64>,
    },

    /// Upload a third-party scanner results file to an existing test
    UploadResults {
        #[arg(long)]
        test_id: String,

        #[arg(long)]
        file: PathBuf,
    },

    /// Generate a report or SBOM and wait for its download link
    Export {
        /// csv, pdf, cyclonedx or spdx
        #[arg(long)]
        format: String,

        /// e.g. ALL_FINDINGS, RISK_SUMMARY, SBOM_ONLY
        #[arg(long)]
        subtype: String,

        #[arg(long, conflicts_with = "product")]
        asset_version: Option<String>,

        #[arg(long)]
        product: Option<String>,

        /// Download the export to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export() {
        let cli = Cli::parse_from([
            "finite-state",
            "export",
            "--format",
            "cyclonedx",
            "--subtype",
            "SBOM_ONLY",
            "--asset-version",
            "av-1",
            "-o",
            "sbom.json",
        ]);
        match cli.command {
            Commands::Export {
                format,
                asset_version,
                output,
                ..
            } => {
                assert_eq!(format, "cyclonedx");
                assert_eq!(asset_version.as_deref(), Some("av-1"));
                assert_eq!(output, Some(PathBuf::from("sbom.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_export_targets_conflict() {
        let result = Cli::try_parse_from([
            "finite-state",
            "export",
            "--format",
            "csv",
            "--subtype",
            "ALL_FINDINGS",
            "--asset-version",
            "av-1",
            "--product",
            "p-1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "finite-state",
            "list",
            "assets",
            "--verbose",
            "--output-format",
            "pretty",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.output_format, OutputFormat::Pretty);
        assert!(
            matches!(cli.command, Commands::List { ref resource, .. } if resource == "assets")
        );
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
