//! tests/result_log_tests.rs

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use crate::errors::DispatchError;
    use crate::models::dispatch_model::{DispatchReport, DispatchResult, MessageKind};
    use crate::services::result_log_service::ResultLogService;

    fn sample_report() -> DispatchReport {
        DispatchReport {
            total: 3,
            results: vec![
                DispatchResult::success(
                    "111",
                    MessageKind::Text,
                    200,
                    json!({"messages": [{"id": "wamid.AAA"}]}),
                    1,
                ),
                DispatchResult::failure(
                    "222",
                    MessageKind::Document,
                    &DispatchError::Rejected {
                        status: 400,
                        body: json!({"error": {"code": 100}}),
                    },
                    1,
                ),
                DispatchResult::dry_run("333", MessageKind::Image),
            ],
        }
    }

    #[test]
    fn test_report_is_written_one_row_per_result() {
        let dir = tempdir().unwrap();
        let service = ResultLogService::new(dir.path().join("logs"));

        let path = service.write_report(&sample_report()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("results_") && name.ends_with(".csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["phone", "kind", "status", "message_id", "error", "dry_run"]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "111");
        assert_eq!(&rows[0][2], "200");
        assert_eq!(&rows[0][3], "wamid.AAA");
        assert_eq!(&rows[1][0], "222");
        assert_eq!(&rows[1][1], "document");
        assert_eq!(&rows[1][2], "400");
        assert!(rows[1][4].contains("rechazó"));
        assert_eq!(&rows[2][2], "dry_run");
        assert_eq!(&rows[2][5], "true");
    }

    #[test]
    fn test_resolve_only_accepts_existing_log_names() {
        let dir = tempdir().unwrap();
        let service = ResultLogService::new(dir.path());
        let path = service.write_report(&sample_report()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();

        assert_eq!(service.resolve(&name), Some(path));
        assert_eq!(service.resolve("results_nope.csv"), None);
        assert_eq!(service.resolve("../results_x.csv"), None);
        assert_eq!(service.resolve("Cargo.toml"), None);
    }
}
