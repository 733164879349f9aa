//! Export request and job types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Formats and Subtypes
// ============================================================================

/// Output format of an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
    CycloneDx,
    Spdx,
}

impl ExportFormat {
    /// Subtypes the platform accepts for this format
    pub fn allowed_subtypes(self) -> &'static [ExportSubtype] {
        match self {
            Self::Csv => &[
                ExportSubtype::AllFindings,
                ExportSubtype::AllComponents,
                ExportSubtype::ExploitIntelligence,
            ],
            Self::Pdf => &[ExportSubtype::RiskSummary],
            Self::CycloneDx => &[
                ExportSubtype::SbomOnly,
                ExportSubtype::SbomWithVdr,
                ExportSubtype::VdrOnly,
            ],
            Self::Spdx => &[ExportSubtype::SbomOnly],
        }
    }

    /// True when `subtype` is valid for this format
    pub fn supports(self, subtype: ExportSubtype) -> bool {
        self.allowed_subtypes().contains(&subtype)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Csv => "CSV",
            Self::Pdf => "PDF",
            Self::CycloneDx => "CYCLONEDX",
            Self::Spdx => "SPDX",
        };
        f.write_str(s)
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            "cyclonedx" | "cdx" => Ok(Self::CycloneDx),
            "spdx" => Ok(Self::Spdx),
            _ => Err(Error::validation(format!("Unknown export format: {s}"))),
        }
    }
}

/// Report or SBOM flavour within a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportSubtype {
    AllFindings,
    AllComponents,
    ExploitIntelligence,
    RiskSummary,
    SbomOnly,
    SbomWithVdr,
    VdrOnly,
}

impl ExportSubtype {
    /// GraphQL enum value
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllFindings => "ALL_FINDINGS",
            Self::AllComponents => "ALL_COMPONENTS",
            Self::ExploitIntelligence => "EXPLOIT_INTELLIGENCE",
            Self::RiskSummary => "RISK_SUMMARY",
            Self::SbomOnly => "SBOM_ONLY",
            Self::SbomWithVdr => "SBOM_WITH_VDR",
            Self::VdrOnly => "VDR_ONLY",
        }
    }
}

impl fmt::Display for ExportSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportSubtype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ALL_FINDINGS" => Ok(Self::AllFindings),
            "ALL_COMPONENTS" => Ok(Self::AllComponents),
            "EXPLOIT_INTELLIGENCE" => Ok(Self::ExploitIntelligence),
            "RISK_SUMMARY" => Ok(Self::RiskSummary),
            "SBOM_ONLY" => Ok(Self::SbomOnly),
            "SBOM_WITH_VDR" => Ok(Self::SbomWithVdr),
            "VDR_ONLY" => Ok(Self::VdrOnly),
            _ => Err(Error::validation(format!("Unknown export subtype: {s}"))),
        }
    }
}

// ============================================================================
// Request
// ============================================================================

/// What an export is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    AssetVersion(String),
    Product(String),
}

/// Parameters of an export launch.
///
/// Exactly one of `asset_version_id` and `product_id` must be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub subtype: ExportSubtype,
    pub asset_version_id: Option<String>,
    pub product_id: Option<String>,
}

impl ExportRequest {
    /// Create a request with no target set
    pub fn new(format: ExportFormat, subtype: ExportSubtype) -> Self {
        Self {
            format,
            subtype,
            asset_version_id: None,
            product_id: None,
        }
    }

    /// Scope the export to an asset version
    #[must_use]
    pub fn asset_version(mut self, id: impl Into<String>) -> Self {
        self.asset_version_id = Some(id.into());
        self
    }

    /// Scope the export to a product
    #[must_use]
    pub fn product(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }

    /// Check the request and resolve its target. Never touches the network.
    pub fn validate(&self) -> Result<ExportTarget> {
        let asset_version = self.asset_version_id.as_deref().filter(|s| !s.is_empty());
        let product = self.product_id.as_deref().filter(|s| !s.is_empty());

        let target = match (asset_version, product) {
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    "Cannot specify both asset_version_id and product_id",
                ))
            }
            (None, None) => {
                return Err(Error::validation(
                    "Must specify either asset_version_id or product_id",
                ))
            }
            (Some(id), None) => ExportTarget::AssetVersion(id.to_string()),
            (None, Some(id)) => ExportTarget::Product(id.to_string()),
        };

        if !self.format.supports(self.subtype) {
            let allowed: Vec<&str> = self
                .format
                .allowed_subtypes()
                .iter()
                .map(|s| s.as_str())
                .collect();
            return Err(Error::validation(format!(
                "Subtype {} is not valid for {} exports (expected one of: {})",
                self.subtype,
                self.format,
                allowed.join(", ")
            )));
        }

        Ok(target)
    }
}

// ============================================================================
// Job
// ============================================================================

/// Server-reported state of an export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl ExportStatus {
    /// Parse the status string; a missing status counts as pending
    pub fn parse(status: Option<&str>) -> Self {
        match status {
            None => Self::Pending,
            Some("PENDING") => Self::Pending,
            Some("RUNNING") => Self::Running,
            Some("COMPLETED") => Self::Completed,
            Some("FAILED") => Self::Failed,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::Running => f.write_str("RUNNING"),
            Self::Completed => f.write_str("COMPLETED"),
            Self::Failed => f.write_str("FAILED"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// One observation of an export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub export_job_id: String,
    pub status: ExportStatus,
    /// Present only once the job has completed
    pub download_link: Option<String>,
}

impl ExportJob {
    /// The download link, if the job is completed and the link is present
    pub fn ready_link(&self) -> Option<&str> {
        match self.status {
            ExportStatus::Completed => self.download_link.as_deref().filter(|l| !l.is_empty()),
            _ => None,
        }
    }
}
