//! Export module
//!
//! Server-side report and SBOM generation.
//!
//! # Flow
//!
//! 1. Validate the request: exactly one of asset version / product, and a
//!    subtype allowed for the format
//! 2. Launch the format-specific mutation and take its `exportJobId`
//! 3. Sleep, query `generateExportDownloadPresignedUrl`, repeat until the job
//!    is `COMPLETED` with a `downloadLink`
//! 4. Optionally GET the link to a local file
//!
//! | Format    | Subtypes                                            |
//! |-----------|-----------------------------------------------------|
//! | CSV       | ALL_FINDINGS, ALL_COMPONENTS, EXPLOIT_INTELLIGENCE  |
//! | PDF       | RISK_SUMMARY                                        |
//! | CycloneDX | SBOM_ONLY, SBOM_WITH_VDR, VDR_ONLY                  |
//! | SPDX      | SBOM_ONLY                                           |

mod launch;
mod poller;
mod types;

pub use launch::LaunchMutation;
pub use poller::ExportPoller;
pub use types::{ExportFormat, ExportJob, ExportRequest, ExportStatus, ExportSubtype, ExportTarget};

#[cfg(test)]
mod tests;
