// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # Finite State SDK
//!
//! Async client for the Finite State GraphQL platform.
//!
//! ## Features
//!
//! - **Transport**: bearer-authenticated GraphQL with GraphQL `errors` surfaced
//!   as errors, plus direct PUT/GET against pre-signed storage URLs
//! - **Pagination**: follow `_cursor` across pages and return every record
//! - **Uploads**: chunked multipart upload for binary analysis, single-file
//!   upload for third-party scanner results
//! - **Exports**: launch report and SBOM jobs and poll for the download link
//! - **Resources**: declarative create mutations and list queries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use finite_state_sdk::http::ApiClient;
//! use finite_state_sdk::resources::{get_all, QueryFilter, ASSETS};
//! use finite_state_sdk::{ClientConfig, Credentials, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ApiClient::new(ClientConfig::default(), Credentials::from_env()?)?;
//!
//!     let assets = get_all(&client, &ASSETS, &QueryFilter::new()).await?;
//!     println!("{} assets", assets.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │         resources (descriptors, templates, workflows)     │
//! └───────────────────────────────────────────────────────────┘
//!                  │                │               │
//!          ┌───────┴─────┐  ┌───────┴──────┐ ┌──────┴───────┐
//!          │ pagination  │  │    upload    │ │    export    │
//!          └───────┬─────┘  └───────┬──────┘ └──────┬───────┘
//!                  └────────────────┼───────────────┘
//!                          ┌────────┴────────┐
//!                          │ http::Transport │──── auth
//!                          └─────────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the SDK
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration and credentials
pub mod config;

/// OAuth client-credentials authentication
pub mod auth;

/// GraphQL and object-storage transport
pub mod http;

/// Cursor pagination
pub mod pagination;

/// Multipart and single-file uploads
pub mod upload;

/// Report and SBOM export jobs
pub mod export;

/// Declarative resource mutations, list queries and upload workflows
pub mod resources;

/// Command-line interface
pub mod cli;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ClientConfig, Credentials};
pub use error::{Error, Result};
pub use http::{ApiClient, Transport};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
