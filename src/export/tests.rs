//! Tests for export module

use super::*;
use crate::error::Error;
use crate::testing::{RecordedTransfer, ScriptedTransport};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use test_case::test_case;

const INTERVAL: Duration = Duration::from_secs(10);

fn launched(field: &str) -> Value {
    json!({"data": {field: {"exportJobId": "job-1"}}})
}

fn status(status: &str, link: Option<&str>) -> Value {
    json!({"data": {"generateExportDownloadPresignedUrl": {
        "status": status,
        "downloadLink": link
    }}})
}

fn cdx_request() -> ExportRequest {
    ExportRequest::new(ExportFormat::CycloneDx, ExportSubtype::SbomOnly).asset_version("av-1")
}

// ============================================================================
// Request Validation Tests
// ============================================================================

#[test_case(ExportFormat::Csv, ExportSubtype::AllFindings ; "csv all findings")]
#[test_case(ExportFormat::Csv, ExportSubtype::AllComponents ; "csv all components")]
#[test_case(ExportFormat::Csv, ExportSubtype::ExploitIntelligence ; "csv exploit intelligence")]
#[test_case(ExportFormat::Pdf, ExportSubtype::RiskSummary ; "pdf risk summary")]
#[test_case(ExportFormat::CycloneDx, ExportSubtype::SbomOnly ; "cdx sbom only")]
#[test_case(ExportFormat::CycloneDx, ExportSubtype::SbomWithVdr ; "cdx sbom with vdr")]
#[test_case(ExportFormat::CycloneDx, ExportSubtype::VdrOnly ; "cdx vdr only")]
#[test_case(ExportFormat::Spdx, ExportSubtype::SbomOnly ; "spdx sbom only")]
fn test_supported_combinations(format: ExportFormat, subtype: ExportSubtype) {
    let target = ExportRequest::new(format, subtype)
        .product("p-1")
        .validate()
        .unwrap();
    assert_eq!(target, ExportTarget::Product("p-1".to_string()));
}

#[test_case(ExportFormat::Csv, ExportSubtype::RiskSummary ; "csv risk summary")]
#[test_case(ExportFormat::Pdf, ExportSubtype::AllFindings ; "pdf all findings")]
#[test_case(ExportFormat::CycloneDx, ExportSubtype::AllComponents ; "cdx all components")]
#[test_case(ExportFormat::Spdx, ExportSubtype::SbomWithVdr ; "spdx sbom with vdr")]
#[test_case(ExportFormat::Spdx, ExportSubtype::VdrOnly ; "spdx vdr only")]
fn test_unsupported_combinations(format: ExportFormat, subtype: ExportSubtype) {
    let err = ExportRequest::new(format, subtype)
        .asset_version("av-1")
        .validate()
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_exactly_one_target_required() {
    let both = cdx_request().product("p-1");
    assert!(both.validate().unwrap_err().is_validation());

    let neither = ExportRequest::new(ExportFormat::Csv, ExportSubtype::AllFindings);
    assert!(neither.validate().unwrap_err().is_validation());

    // empty strings do not count as a target
    let empty = ExportRequest::new(ExportFormat::Csv, ExportSubtype::AllFindings)
        .asset_version("")
        .product("p-1");
    assert_eq!(
        empty.validate().unwrap(),
        ExportTarget::Product("p-1".to_string())
    );
}

#[test]
fn test_format_and_subtype_parsing() {
    assert_eq!("cyclonedx".parse::<ExportFormat>().unwrap(), ExportFormat::CycloneDx);
    assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
    assert!("xml".parse::<ExportFormat>().unwrap_err().is_validation());

    assert_eq!(
        "sbom-with-vdr".parse::<ExportSubtype>().unwrap(),
        ExportSubtype::SbomWithVdr
    );
    assert_eq!(
        "ALL_FINDINGS".parse::<ExportSubtype>().unwrap(),
        ExportSubtype::AllFindings
    );
    assert!("everything".parse::<ExportSubtype>().is_err());
}

#[test]
fn test_status_parsing() {
    assert_eq!(ExportStatus::parse(Some("COMPLETED")), ExportStatus::Completed);
    assert_eq!(ExportStatus::parse(Some("FAILED")), ExportStatus::Failed);
    assert_eq!(ExportStatus::parse(None), ExportStatus::Pending);
    assert_eq!(
        ExportStatus::parse(Some("QUEUED")),
        ExportStatus::Other("QUEUED".to_string())
    );
}

#[test]
fn test_ready_link_requires_completed_and_link() {
    let job = |status, link: Option<&str>| ExportJob {
        export_job_id: "j".to_string(),
        status,
        download_link: link.map(ToString::to_string),
    };
    assert_eq!(job(ExportStatus::Completed, Some("u")).ready_link(), Some("u"));
    assert_eq!(job(ExportStatus::Completed, None).ready_link(), None);
    assert_eq!(job(ExportStatus::Completed, Some("")).ready_link(), None);
    assert_eq!(job(ExportStatus::Running, Some("u")).ready_link(), None);
}

// ============================================================================
// Launch Mutation Tests
// ============================================================================

#[test]
fn test_launch_mutation_per_target() {
    let m = LaunchMutation::resolve(
        ExportFormat::Csv,
        ExportSubtype::AllFindings,
        &ExportTarget::AssetVersion("av-1".to_string()),
    );
    assert_eq!(m.field, "launchArtifactCSVExport");
    assert_eq!(
        m.variables,
        json!({"artifactCsvExportType": "ALL_FINDINGS", "assetVersionId": "av-1"})
    );

    let m = LaunchMutation::resolve(
        ExportFormat::Pdf,
        ExportSubtype::RiskSummary,
        &ExportTarget::Product("p-1".to_string()),
    );
    assert_eq!(m.field, "launchProductPdfExport");
    assert_eq!(
        m.variables,
        json!({"productPdfExportType": "RISK_SUMMARY", "productId": "p-1"})
    );

    let m = LaunchMutation::resolve(
        ExportFormat::Spdx,
        ExportSubtype::SbomOnly,
        &ExportTarget::Product("p-1".to_string()),
    );
    assert_eq!(m.field, "launchSpdxExport");
    assert_eq!(
        m.variables,
        json!({"spdxSubtype": "SBOM_ONLY", "assetVersionId": null, "productId": "p-1"})
    );
}

// ============================================================================
// Poller Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_poller_keeps_polling_until_completed_with_link() {
    let transport = ScriptedTransport::new()
        .respond(launched("launchCycloneDxExport"))
        .respond(status("RUNNING", None))
        .respond(status("RUNNING", None))
        .respond(status("COMPLETED", None))
        .respond(status("COMPLETED", Some("https://storage.example.com/sbom.json")));

    let started = tokio::time::Instant::now();
    let link = ExportPoller::new(&transport, INTERVAL)
        .launch_and_await(&cdx_request())
        .await
        .unwrap();

    assert_eq!(link, "https://storage.example.com/sbom.json");

    let calls = transport.calls();
    assert!(calls[0].is("launchCycloneDxExport"));
    assert_eq!(
        calls[0].variables,
        json!({"cdxSubtype": "SBOM_ONLY", "assetVersionId": "av-1", "productId": null})
    );
    let polls: Vec<_> = calls
        .iter()
        .filter(|c| c.is("generateExportDownloadPresignedUrl"))
        .collect();
    assert_eq!(polls.len(), 4);
    for poll in polls {
        assert_eq!(poll.variables, json!({"exportId": "job-1"}));
    }

    // one full interval slept before each of the four queries
    assert!(started.elapsed() >= INTERVAL * 4);
}

#[tokio::test]
async fn test_poller_validates_before_any_call() {
    let transport = ScriptedTransport::new();
    let poller = ExportPoller::new(&transport, INTERVAL);

    let both = cdx_request().product("p-1");
    assert!(poller.launch_and_await(&both).await.unwrap_err().is_validation());

    let bad_subtype =
        ExportRequest::new(ExportFormat::Pdf, ExportSubtype::SbomOnly).asset_version("av-1");
    assert!(poller
        .launch_and_await(&bad_subtype)
        .await
        .unwrap_err()
        .is_validation());

    assert!(transport.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_poller_failed_status_is_terminal() {
    let transport = ScriptedTransport::new()
        .respond(launched("launchArtifactCSVExport"))
        .respond(status("RUNNING", None))
        .respond(status("FAILED", None))
        .respond(status("COMPLETED", Some("never-reached")));

    let request =
        ExportRequest::new(ExportFormat::Csv, ExportSubtype::AllComponents).asset_version("av-1");
    let err = ExportPoller::new(&transport, INTERVAL)
        .launch_and_await(&request)
        .await
        .unwrap_err();

    match err {
        Error::ExportFailed {
            export_job_id,
            status,
        } => {
            assert_eq!(export_job_id, "job-1");
            assert_eq!(status, "FAILED");
        }
        other => panic!("expected ExportFailed, got {other:?}"),
    }
    assert_eq!(transport.remaining(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poller_cancellation_stops_waiting() {
    let mut transport = ScriptedTransport::new().respond(launched("launchCycloneDxExport"));
    for _ in 0..10 {
        transport = transport.respond(status("RUNNING", None));
    }

    let cancel = tokio::time::sleep(Duration::from_secs(25));
    let err = ExportPoller::new(&transport, INTERVAL)
        .launch_and_await_until(&cdx_request(), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled { ref export_job_id } if export_job_id == "job-1"));
    // launch plus polls at 10s and 20s
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test]
async fn test_poller_propagates_status_query_errors() {
    let transport = ScriptedTransport::new()
        .respond(launched("launchCycloneDxExport"))
        .fail(Error::http_status(503, "unavailable"));

    let err = ExportPoller::new(&transport, Duration::ZERO)
        .launch_and_await(&cdx_request())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_launch_missing_job_id() {
    let transport =
        ScriptedTransport::new().respond(json!({"data": {"launchCycloneDxExport": {}}}));

    let err = ExportPoller::new(&transport, INTERVAL)
        .launch(&cdx_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
}

#[tokio::test]
async fn test_download_writes_export_to_disk() {
    let transport = ScriptedTransport::new().with_download_body(b"{\"bomFormat\":\"CycloneDX\"}");
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("sbom.json");

    let written = ExportPoller::new(&transport, INTERVAL)
        .download("https://storage.example.com/sbom.json", &target)
        .await
        .unwrap();

    assert_eq!(written, 25);
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "{\"bomFormat\":\"CycloneDX\"}"
    );
    assert_eq!(
        transport.transfers(),
        vec![RecordedTransfer::Download {
            url: "https://storage.example.com/sbom.json".to_string(),
            path: target.clone(),
        }]
    );
}
