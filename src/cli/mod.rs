//! CLI module
//!
//! Command-line interface for the Finite State platform.
//!
//! # Commands
//!
//! - `token` - Print a bearer token
//! - `query` - Run a paginated GraphQL query from a file
//! - `list` - Run a built-in list query
//! - `upload-binary` - Multipart upload of a binary to a test
//! - `upload-results` - Upload a scanner results file to a test
//! - `export` - Generate a report or SBOM and optionally download it
//!
//! Credentials come from `CLIENT_ID`, `CLIENT_SECRET` and `ORGANIZATION_CONTEXT`.

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
