//! # DevSecOps Interact
//!
//! External I/O around the models: checklist state persisted as a flat
//! key -> boolean map, clipboard copy with fallback, and artifact export.
//! Every failure here degrades to a log line instead of an error.

pub mod checklist;
pub mod clipboard;
pub mod error;
pub mod export;
pub mod storage;

pub use checklist::*;
pub use clipboard::*;
pub use error::*;
pub use export::*;
pub use storage::*;

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose reads and writes always fail
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> InteractResult<Option<bool>> {
            Err(InteractError::Io(std::io::Error::other("read failed")))
        }

        fn set(&mut self, _key: &str, _value: bool) -> InteractResult<()> {
            Err(InteractError::Io(std::io::Error::other("write failed")))
        }
    }

    #[cfg(test)]
    mod storage_tests {
        use super::*;

        #[test]
        fn test_memory_store() {
            let mut store = MemoryStore::new();
            assert_eq!(store.get("code::Run SAST").unwrap(), None);
            store.set("code::Run SAST", true).unwrap();
            assert_eq!(store.get("code::Run SAST").unwrap(), Some(true));
        }

        #[test]
        fn test_json_file_store_persists() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("state").join("checklist.json");

            let mut store = JsonFileStore::open(&path);
            store.set("build::Scan images", true).unwrap();
            store.set("test::Run DAST", false).unwrap();

            let reopened = JsonFileStore::open(&path);
            assert_eq!(reopened.get("build::Scan images").unwrap(), Some(true));
            assert_eq!(reopened.get("test::Run DAST").unwrap(), Some(false));
            assert_eq!(reopened.get("missing").unwrap(), None);
        }

        #[test]
        fn test_json_file_store_tolerates_corruption() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("checklist.json");
            std::fs::write(&path, "{not json").unwrap();

            let store = JsonFileStore::open(&path);
            assert_eq!(store.get("anything").unwrap(), None);
        }

        #[test]
        fn test_json_file_store_drops_non_boolean_entries() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("checklist.json");
            std::fs::write(&path, r#"{"a": true, "b": "true", "c": 3, "d": null}"#).unwrap();

            let store = JsonFileStore::open(&path);
            assert_eq!(store.get("a").unwrap(), Some(true));
            assert_eq!(store.get("b").unwrap(), Some(true));
            assert_eq!(store.get("c").unwrap(), None);
            assert_eq!(store.get("d").unwrap(), None);
        }
    }

    #[cfg(test)]
    mod checklist_tests {
        use super::*;

        #[test]
        fn test_restore_and_toggle() {
            let mut store = MemoryStore::new();
            store.set("code::Enable secret scanning", true).unwrap();

            let mut checklist = Checklist::with_items(
                store,
                [("code", "Enable secret scanning"), ("code", "Run SAST"), ("build", "Scan images")],
            );
            assert_eq!(checklist.checked_count(), 1);

            assert!(checklist.toggle("code", "Run SAST").unwrap());
            assert_eq!(checklist.store().get("code::Run SAST").unwrap(), Some(true));
            assert!(!checklist.toggle("code", "Run SAST").unwrap());
            assert_eq!(checklist.store().get("code::Run SAST").unwrap(), Some(false));
        }

        #[test]
        fn test_unknown_item() {
            let mut checklist = Checklist::new(MemoryStore::new());
            let err = checklist.toggle("plan", "Threat model").unwrap_err();
            assert!(matches!(err, InteractError::UnknownItem(key) if key == "plan::Threat model"));
        }

        #[test]
        fn test_progress() {
            let mut checklist = Checklist::with_items(
                MemoryStore::new(),
                [("code", "a"), ("code", "b"), ("build", "c"), ("build", "d")],
            );
            assert_eq!(checklist.progress(), Some(0.0));

            checklist.set_checked("code", "a", true).unwrap();
            assert_eq!(checklist.progress(), Some(25.0));
            assert_eq!(checklist.progress_for("code"), Some(50.0));
            assert_eq!(checklist.progress_for("deploy"), None);

            assert_eq!(Checklist::new(MemoryStore::new()).progress(), None);
        }

        #[test]
        fn test_register_twice_keeps_one_item() {
            let mut checklist = Checklist::new(MemoryStore::new());
            checklist.register("code", "a");
            checklist.set_checked("code", "a", true).unwrap();
            assert!(checklist.register("code", "a"));
            assert_eq!(checklist.items().len(), 1);
        }

        #[test]
        fn test_store_failures_are_swallowed() {
            let mut checklist = Checklist::with_items(BrokenStore, [("code", "a")]);
            assert_eq!(checklist.checked_count(), 0);

            assert!(checklist.toggle("code", "a").unwrap());
            assert_eq!(checklist.progress(), Some(100.0));
        }
    }

    #[cfg(test)]
    mod clipboard_tests {
        use super::*;

        #[tokio::test]
        async fn test_copy_with_primary() {
            let primary = MemoryClipboard::new();
            let outcome = copy_with_fallback(&primary, None, "trivy image app:latest").await;
            assert_eq!(outcome, CopyOutcome::Copied);
            assert_eq!(primary.contents().as_deref(), Some("trivy image app:latest"));
        }

        #[tokio::test]
        async fn test_copy_falls_back() {
            let primary = MemoryClipboard::unavailable();
            let fallback = MemoryClipboard::new();
            let outcome = copy_with_fallback(&primary, Some(&fallback), "snyk test").await;
            assert_eq!(outcome, CopyOutcome::FellBack);
            assert_eq!(fallback.contents().as_deref(), Some("snyk test"));
        }

        #[tokio::test]
        async fn test_copy_failure_is_reported_not_raised() {
            let primary = MemoryClipboard::unavailable();
            let fallback = MemoryClipboard::unavailable();
            assert_eq!(copy_with_fallback(&primary, Some(&fallback), "x").await, CopyOutcome::Failed);
            assert_eq!(copy_with_fallback(&primary, None, "x").await, CopyOutcome::Failed);
        }

        #[tokio::test]
        async fn test_missing_clipboard_program() {
            let clipboard = CommandClipboard::new("definitely-not-a-clipboard-tool", Vec::<String>::new());
            let err = clipboard.write_text("text").await.unwrap_err();
            assert!(matches!(err, InteractError::ClipboardUnavailable(_)));
        }
    }

    #[cfg(test)]
    mod export_tests {
        use super::*;

        #[tokio::test]
        async fn test_file_export_creates_parents() {
            let dir = tempfile::tempdir().unwrap();
            let sink = FileExportSink::new(dir.path());

            let path = export_artifact(&sink, ".github/workflows/devsecops-pipeline.yml", "name: x\n")
                .await
                .unwrap();
            assert_eq!(path, dir.path().join(".github/workflows/devsecops-pipeline.yml"));
            assert_eq!(std::fs::read_to_string(path).unwrap(), "name: x\n");
        }

        #[tokio::test]
        async fn test_export_rejects_escaping_names() {
            let sink = MemoryExportSink::new();
            assert!(export_artifact(&sink, "../outside.json", "{}").await.is_none());
            assert!(export_artifact(&sink, "/etc/passwd", "{}").await.is_none());
            assert!(export_artifact(&sink, "", "{}").await.is_none());

            assert!(export_artifact(&sink, "threat-report-2024-01-01.json", "{}").await.is_some());
            assert_eq!(sink.artifact("threat-report-2024-01-01.json").as_deref(), Some("{}"));
        }

        #[tokio::test]
        async fn test_export_failure_is_swallowed() {
            let dir = tempfile::tempdir().unwrap();
            let blocker = dir.path().join("blocker");
            std::fs::write(&blocker, "file, not a directory").unwrap();

            let sink = FileExportSink::new(&blocker);
            assert!(export_artifact(&sink, "report.json", "{}").await.is_none());
        }
    }
}
