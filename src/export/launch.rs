//! Launch mutations for each export format and target

use super::types::{ExportFormat, ExportSubtype, ExportTarget};
use crate::types::JsonValue;
use serde_json::json;

const LAUNCH_ARTIFACT_CSV_EXPORT: &str = r#"
mutation LaunchArtifactCSVExport($artifactCsvExportType: ArtifactCSVExportType!, $assetVersionId: ID!) {
    launchArtifactCSVExport(artifactCsvExportType: $artifactCsvExportType, assetVersionId: $assetVersionId) {
        exportJobId
    }
}
"#;

const LAUNCH_PRODUCT_CSV_EXPORT: &str = r#"
mutation LaunchProductCSVExport($productCsvExportType: ProductCSVExportType!, $productId: ID!) {
    launchProductCSVExport(productCsvExportType: $productCsvExportType, productId: $productId) {
        exportJobId
    }
}
"#;

const LAUNCH_ARTIFACT_PDF_EXPORT: &str = r#"
mutation LaunchArtifactPdfExport($artifactPdfExportType: ArtifactPdfExportType!, $assetVersionId: ID!) {
    launchArtifactPdfExport(artifactPdfExportType: $artifactPdfExportType, assetVersionId: $assetVersionId) {
        exportJobId
    }
}
"#;

const LAUNCH_PRODUCT_PDF_EXPORT: &str = r#"
mutation LaunchProductPdfExport($productPdfExportType: ProductPdfExportType!, $productId: ID!) {
    launchProductPdfExport(productPdfExportType: $productPdfExportType, productId: $productId) {
        exportJobId
    }
}
"#;

const LAUNCH_CYCLONEDX_EXPORT: &str = r#"
mutation LaunchCycloneDxExport($cdxSubtype: CycloneDxExportSubtype!, $assetVersionId: ID, $productId: ID) {
    launchCycloneDxExport(cdxSubtype: $cdxSubtype, assetVersionId: $assetVersionId, productId: $productId) {
        exportJobId
    }
}
"#;

const LAUNCH_SPDX_EXPORT: &str = r#"
mutation LaunchSpdxExport($spdxSubtype: SpdxExportSubtype!, $assetVersionId: ID, $productId: ID) {
    launchSpdxExport(spdxSubtype: $spdxSubtype, assetVersionId: $assetVersionId, productId: $productId) {
        exportJobId
    }
}
"#;

/// A launch mutation resolved for one request
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchMutation {
    pub query: &'static str,
    /// Result field holding `exportJobId`
    pub field: &'static str,
    pub variables: JsonValue,
}

impl LaunchMutation {
    /// Pick the mutation for a validated format, subtype and target
    pub fn resolve(format: ExportFormat, subtype: ExportSubtype, target: &ExportTarget) -> Self {
        let subtype = subtype.as_str();
        match (format, target) {
            (ExportFormat::Csv, ExportTarget::AssetVersion(id)) => Self {
                query: LAUNCH_ARTIFACT_CSV_EXPORT,
                field: "launchArtifactCSVExport",
                variables: json!({"artifactCsvExportType": subtype, "assetVersionId": id}),
            },
            (ExportFormat::Csv, ExportTarget::Product(id)) => Self {
                query: LAUNCH_PRODUCT_CSV_EXPORT,
                field: "launchProductCSVExport",
                variables: json!({"productCsvExportType": subtype, "productId": id}),
            },
            (ExportFormat::Pdf, ExportTarget::AssetVersion(id)) => Self {
                query: LAUNCH_ARTIFACT_PDF_EXPORT,
                field: "launchArtifactPdfExport",
                variables: json!({"artifactPdfExportType": subtype, "assetVersionId": id}),
            },
            (ExportFormat::Pdf, ExportTarget::Product(id)) => Self {
                query: LAUNCH_PRODUCT_PDF_EXPORT,
                field: "launchProductPdfExport",
                variables: json!({"productPdfExportType": subtype, "productId": id}),
            },
            (ExportFormat::CycloneDx, target) => Self {
                query: LAUNCH_CYCLONEDX_EXPORT,
                field: "launchCycloneDxExport",
                variables: sbom_variables("cdxSubtype", subtype, target),
            },
            (ExportFormat::Spdx, target) => Self {
                query: LAUNCH_SPDX_EXPORT,
                field: "launchSpdxExport",
                variables: sbom_variables("spdxSubtype", subtype, target),
            },
        }
    }
}

fn sbom_variables(subtype_key: &str, subtype: &str, target: &ExportTarget) -> JsonValue {
    let (asset_version_id, product_id) = match target {
        ExportTarget::AssetVersion(id) => (Some(id.as_str()), None),
        ExportTarget::Product(id) => (None, Some(id.as_str())),
    };
    json!({
        subtype_key: subtype,
        "assetVersionId": asset_version_id,
        "productId": product_id,
    })
}
