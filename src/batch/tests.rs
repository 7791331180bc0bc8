use std::sync::{Arc, Mutex};

use super::*;
use crate::constants::UNKNOWN_TITLE;
use crate::embedding::MockEmbedder;
use crate::mapping::{CanonicalMapping, MappingLoadError, MemoryMappingStore};
use crate::resolver::Confidence;

const INPUT: &str = "Emp ID\tDesignation*\tDepartment\n\
                     1\tAsst Engg\tCivil\n\
                     2\tcarpendry\tWorks\n\
                     3\tnan\tCivil\n\
                     4\tFlorist\tGarden\n\
                     5\tProject Engineer\tCivil\n\
                     6\tENGINEER\t\n";

fn mapping() -> CanonicalMapping {
    CanonicalMapping::from_raw_entries([
        ("engineer", "Engineer"),
        ("assistant engineer", "Engineer"),
        ("carpenter", "Carpenter"),
    ])
}

fn embedder() -> Arc<MockEmbedder> {
    Arc::new(
        MockEmbedder::new(5)
            .with_vector("engineer", &[1.0, 0.0, 0.0, 0.0])
            .with_vector("assistant engineer", &[0.0, 1.0, 0.0, 0.0])
            .with_vector("carpenter", &[0.0, 0.0, 1.0, 0.0])
            .with_vector("project engineer", &[0.95, 0.0, 0.0, 0.3122])
            .with_vector("florist", &[0.0, 0.0, 0.5, 0.866]),
    )
}

fn driver(store: Arc<MemoryMappingStore>, embedder: Arc<MockEmbedder>) -> BatchDriver {
    BatchDriver::new(store, embedder)
}

fn request() -> BatchRequest {
    BatchRequest::new("Designation*").with_department_column("Department")
}

fn table() -> InputTable {
    InputTable::from_tsv(INPUT).unwrap()
}

mod driver_tests {
    use super::*;

    #[test]
    fn test_full_run() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let report = driver(store.clone(), embedder())
            .run(&table(), &request(), &NoProgress, &CancelFlag::new())
            .unwrap();

        assert_eq!(
            report.standardized,
            vec!["Engineer", "Carpenter", "", UNKNOWN_TITLE, "Engineer", "Engineer"]
        );
        let confidences: Vec<Confidence> = report.results.iter().map(|r| r.confidence).collect();
        assert_eq!(
            confidences,
            vec![
                Confidence::ExactDictionary,
                Confidence::ExactDictionary,
                Confidence::Blank,
                Confidence::Unknown,
                Confidence::AutoLearned,
                Confidence::ExactDictionary,
            ]
        );

        assert_eq!(report.unknown_titles, vec!["florist"]);

        let summary = &report.summary;
        assert_eq!(summary.rows, 6);
        assert_eq!(summary.counts.total(), 6);
        assert_eq!(summary.counts.exact_dictionary, 3);
        assert_eq!(summary.counts.blank, 1);
        assert_eq!(summary.auto_learned_variants, 1);
        assert_eq!(summary.mapping_entries, 4);
        assert!(summary.mapping_fully_persisted);
        assert!(summary.finished_at >= summary.started_at);

        assert_eq!(store.writes(), 1);
        assert_eq!(store.stored().unwrap().get("project engineer"), Some("Engineer"));
    }

    #[test]
    fn test_department_grouping() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let report = driver(store, embedder())
            .run(&table(), &request(), &NoProgress, &CancelFlag::new())
            .unwrap();

        let departments = report.departments.unwrap();
        let keys: Vec<&str> = departments.keys().map(String::as_str).collect();
        // Garden only has an Unknown row; row 6 has no department.
        assert_eq!(keys, vec!["Civil", "Works"]);
        assert_eq!(departments["Civil"], vec!["Engineer"]);
        assert_eq!(departments["Works"], vec!["Carpenter"]);
    }

    #[test]
    fn test_missing_department_column_skips_grouping() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let request = BatchRequest::new("Designation*").with_department_column("Dept");
        let report = driver(store, embedder())
            .run(&table(), &request, &NoProgress, &CancelFlag::new())
            .unwrap();
        assert!(report.departments.is_none());
    }

    #[test]
    fn test_missing_column_fails_before_loading() {
        let store = Arc::new(MemoryMappingStore::missing());
        let err = driver(store, embedder())
            .run(&table(), &BatchRequest::new("Title"), &NoProgress, &CancelFlag::new())
            .unwrap_err();

        match err {
            BatchError::MissingColumn { column, available } => {
                assert_eq!(column, "Title");
                assert_eq!(available, vec!["Emp ID", "Designation*", "Department"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mapping_load_failure_is_fatal() {
        let store = Arc::new(MemoryMappingStore::missing());
        let calls = Mutex::new(0usize);
        let progress = |_done: usize, _total: usize| *calls.lock().unwrap() += 1;

        let err = driver(store, embedder())
            .run(&table(), &request(), &progress, &CancelFlag::new())
            .unwrap_err();
        assert!(matches!(
            err,
            BatchError::MappingLoad(MappingLoadError::NotFound { .. })
        ));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_progress_reports_every_row() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let seen = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| seen.lock().unwrap().push((done, total));

        driver(store, embedder())
            .run(&table(), &request(), &progress, &CancelFlag::new())
            .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, (1..=6).map(|i| (i, 6)).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel_before_first_row() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let cancel = CancelFlag::new();
        cancel.cancel();

        let err = driver(store, embedder())
            .run(&table(), &request(), &NoProgress, &cancel)
            .unwrap_err();
        assert!(matches!(err, BatchError::Cancelled { processed: 0 }));
    }

    #[test]
    fn test_cancel_mid_run() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let cancel = CancelFlag::new();
        let trigger = cancel.clone();
        let progress = move |done: usize, _total: usize| {
            if done == 2 {
                trigger.cancel();
            }
        };

        let err = driver(store, embedder())
            .run(&table(), &request(), &progress, &cancel)
            .unwrap_err();
        assert!(matches!(err, BatchError::Cancelled { processed: 2 }));
    }

    #[test]
    fn test_change_ranking_toggle() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let driver = driver(store, embedder());

        let ranked = driver
            .run(&table(), &request().with_review_top_k(3), &NoProgress, &CancelFlag::new())
            .unwrap();
        let changes = ranked.changes.unwrap();
        assert!(changes.len() <= 3);
        assert!(changes.iter().all(|c| c.row != 2));

        let unranked = driver
            .run(&table(), &request().with_review_top_k(0), &NoProgress, &CancelFlag::new())
            .unwrap();
        assert!(unranked.changes.is_none());
    }

    #[test]
    fn test_persistence_failure_flags_run() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        store.set_fail_writes(true);

        let report = driver(store.clone(), embedder())
            .run(&table(), &request(), &NoProgress, &CancelFlag::new())
            .unwrap();

        assert_eq!(report.standardized[4], "Engineer");
        assert!(!report.summary.mapping_fully_persisted);
        assert_eq!(report.summary.persistence_failures, 1);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_embedding_failure_aborts() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let embedder = embedder();
        embedder.set_failing(true);

        let err = driver(store, embedder)
            .run(&table(), &request(), &NoProgress, &CancelFlag::new())
            .unwrap_err();
        assert!(matches!(err, BatchError::Resolve(_)));
    }

    #[test]
    fn test_report_serializes() {
        let store = Arc::new(MemoryMappingStore::new(mapping()));
        let report = driver(store, embedder())
            .run(&table(), &request(), &NoProgress, &CancelFlag::new())
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["rows"], 6);
        assert_eq!(json["results"][4]["confidence"], "auto_learned");
        assert_eq!(json["unknown_titles"][0], "florist");
    }
}

mod table_tests {
    use super::*;

    #[test]
    fn test_from_tsv() {
        let table = table();
        assert_eq!(table.len(), 6);
        assert_eq!(table.column_index("Department"), Some(2));
        assert_eq!(table.column(1)[0], "Asst Engg");
        assert_eq!(table.column(2)[5], "");
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = InputTable::from_tsv("a\tb\n1\n").unwrap();
        assert_eq!(table.column(1), vec![""]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            InputTable::from_tsv("\n\n"),
            Err(BatchError::InvalidTable { .. })
        ));
    }

    #[test]
    fn test_append_column() {
        let table = InputTable::from_tsv("id\ttitle\n1\tasst engg\n2\n").unwrap();
        let out = table
            .to_tsv_with_column("Standardized Title", &["Engineer".to_string(), String::new()])
            .unwrap();
        assert_eq!(
            out,
            "id\ttitle\tStandardized Title\n1\tasst engg\tEngineer\n2\t\t\n"
        );
    }

    #[test]
    fn test_quoted_cells_keep_tabs_and_line_breaks() {
        let input = "id\ttitle\tDepartment\n1\t\"Sr\tEngineer\"\tCivil\n2\t\"Site\nSupervisor\"\tWorks\n";
        let table = InputTable::from_tsv(input).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column(1), vec!["Sr\tEngineer", "Site\nSupervisor"]);
        assert_eq!(table.column(2), vec!["Civil", "Works"]);

        let values = vec!["Senior Engineer".to_string(), "Site Supervisor".to_string()];
        let out = table.to_tsv_with_column("Standardized Title", &values).unwrap();
        assert_eq!(InputTable::from_tsv(&out).unwrap().column(3), vec!["Senior Engineer", "Site Supervisor"]);
        assert!(out.contains("\"Sr\tEngineer\""));
    }

    #[test]
    fn test_wide_rows_are_cut_to_header_width() {
        let table = InputTable::from_tsv("id\ttitle\n1\tengineer\tstray\textra\n").unwrap();
        let out = table
            .to_tsv_with_column("Standardized Title", &["Engineer".to_string()])
            .unwrap();
        assert_eq!(out, "id\ttitle\tStandardized Title\n1\tengineer\tEngineer\n");
    }

    #[test]
    fn test_counts() {
        let mut counts = ClassificationCounts::default();
        counts.record(Confidence::Fuzzy);
        counts.record(Confidence::Fuzzy);
        counts.record(Confidence::Unknown);
        assert_eq!(counts.get(Confidence::Fuzzy), 2);
        assert_eq!(counts.total(), 3);
    }
}
