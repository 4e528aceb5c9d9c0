// Integration tests for the DevSecOps crates
// These tests drive the models through the interaction layer end to end

use devsecops_core::{Level, Stage, StrideCategory, UuidIdGenerator};
use devsecops_interact::{
    copy_with_fallback, export_artifact, Checklist, CopyOutcome, FileExportSink, JsonFileStore, MemoryClipboard,
    MemoryExportSink,
};
use devsecops_pipeline::{PipelineCatalog, PipelineModel, WORKFLOW_PATH};
use devsecops_threat::{ComponentType, ScoringPolicy, ThreatLibrary, ThreatModel, ThreatStatus, ThreatTemplate};

#[tokio::test]
async fn test_sample_pipeline_export_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = PipelineModel::new(PipelineCatalog::default()).unwrap();
    pipeline.load_sample_pipeline();
    pipeline.enable_gate("block-on-critical");

    let exported = pipeline.export_configuration();
    let sink = FileExportSink::new(dir.path());
    let path = export_artifact(&sink, WORKFLOW_PATH, &exported.to_yaml()).await.unwrap();

    let written = std::fs::read_to_string(path).unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
    let jobs = parsed["jobs"].as_mapping().unwrap();
    let names: Vec<&str> = jobs.keys().filter_map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["code-security", "build-security", "test-security"]);

    let build_steps = parsed["jobs"]["build-security"]["steps"].as_sequence().unwrap();
    assert_eq!(build_steps[1]["with"]["severity"].as_str(), Some("CRITICAL,HIGH"));
    assert_eq!(exported.unmapped_tools, vec!["pre-commit".to_string()]);

    let configuration = pipeline.get_configuration();
    assert!(configuration.security_gates.contains("block-on-critical"));
    assert_eq!(configuration.tools.len(), 4);
    assert_eq!(pipeline.compute_coverage_score(), 38);
}

#[tokio::test]
async fn test_threat_report_export() {
    let mut model = ThreatModel::default();
    model.place_component("web-server", 100.0, 100.0);
    let database = model.place_component("database", 300.0, 100.0).clone();
    model.place_component("api", 200.0, 250.0);
    assert_eq!(model.compute_security_score(), 90);

    let report = model.generate_report();
    let sink = MemoryExportSink::new();
    export_artifact(&sink, &report.file_name(), &report.to_json_pretty().unwrap())
        .await
        .unwrap();

    let stored = sink.artifact(&report.file_name()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(value["summary"]["totalComponents"], 3);
    assert_eq!(value["summary"]["totalThreats"], 6);
    assert_eq!(value["summary"]["criticalThreats"], 2);
    assert_eq!(value["summary"]["highThreats"], 4);
    assert_eq!(value["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(value["recommendations"][0]["component"], "database");

    model.remove_component(&database.id).unwrap();
    assert_eq!(model.compute_security_score(), 100);
    assert!(model.generate_report().recommendations.is_empty());
}

#[test]
fn test_custom_library_with_uuid_ids_and_open_only_scoring() {
    let library: ThreatLibrary = serde_json::from_str(
        r#"{
            "queue": [
                {"type": "dos", "description": "Message flooding", "impact": "critical", "likelihood": "high", "mitigation": "rate limiting"},
                {"type": "tampering", "description": "Message forgery", "impact": "high", "likelihood": "low", "mitigation": "message signing"}
            ]
        }"#,
    )
    .unwrap();

    let mut model = ThreatModel::new(library, Box::new(UuidIdGenerator)).with_policy(ScoringPolicy::OpenOnly);
    model.register_threat_templates(
        "cache",
        vec![ThreatTemplate::new(
            StrideCategory::InformationDisclosure,
            "Cache poisoning",
            Level::High,
            Level::Medium,
            "key validation",
        )],
    );

    let queue = model.place_component("queue", 0.0, 0.0).clone();
    let cache = model.place_component(ComponentType::from("cache"), 0.0, 0.0).clone();
    assert_ne!(queue.id, cache.id);
    assert_ne!(queue.threats[0].id, queue.threats[1].id);
    assert_eq!(queue.threats[0].template.category, StrideCategory::DenialOfService);
    assert_eq!(model.compute_security_score(), 95);

    model
        .set_threat_status(&queue.id, &queue.threats[0].id, ThreatStatus::Mitigated)
        .unwrap();
    assert_eq!(model.compute_security_score(), 100);
    assert_eq!(model.generate_report().summary.critical_threats, 1);
}

#[test]
fn test_checklist_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checklist.json");
    let items: Vec<(String, String)> = Stage::ALL
        .iter()
        .map(|stage| (stage.to_string(), format!("Review {} controls", stage.display_name())))
        .collect();

    {
        let mut checklist = Checklist::with_items(JsonFileStore::open(&path), items.clone());
        checklist.toggle("build", "Review Build controls").unwrap();
        checklist.toggle("deploy", "Review Deploy controls").unwrap();
        assert_eq!(checklist.progress(), Some(25.0));
    }

    let checklist = Checklist::with_items(JsonFileStore::open(&path), items);
    assert_eq!(checklist.checked_count(), 2);
    assert_eq!(checklist.progress_for("build"), Some(100.0));

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["build::Review Build controls"], true);
}

#[tokio::test]
async fn test_copy_exported_workflow_with_fallback() {
    let mut pipeline = PipelineModel::new(PipelineCatalog::default()).unwrap();
    pipeline.attach_tool("snyk", Stage::Code).unwrap();
    let yaml = pipeline.export_configuration().to_yaml();

    let system = MemoryClipboard::unavailable();
    let fallback = MemoryClipboard::new();
    let outcome = copy_with_fallback(&system, Some(&fallback), &yaml).await;

    assert_eq!(outcome, CopyOutcome::FellBack);
    assert!(fallback.contents().unwrap().contains("uses: snyk/actions/node@master"));
}

#[test]
fn test_timestamped_report_name() {
    use chrono::TimeZone;

    let timestamp = chrono::Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
    let report = ThreatModel::default().generate_report_at(timestamp);
    assert_eq!(report.file_name(), "threat-report-2025-12-31.json");
}
