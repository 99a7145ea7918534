//! tests/dispatch_tests.rs
//! Pruebas del motor de envío: concurrencia, reintentos, dry-run y progreso.

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use serde_json::json;
    use tokio::time::Instant;

    use crate::config::whatsapp_config::RetryPolicy;
    use crate::errors::DispatchError;
    use crate::models::dispatch_model::{MessageKind, PlannedRequest};
    use crate::services::dispatch_service::DispatchService;
    use crate::services::request_builder_service::text_request;
    use crate::tests::fake_transport::{FakeTransport, Scripted};

    fn retry(retries: u32, backoff_ms: u64) -> RetryPolicy {
        RetryPolicy {
            retries,
            initial_backoff: Duration::from_millis(backoff_ms),
        }
    }

    fn texts(phones: &[&str]) -> Vec<PlannedRequest> {
        phones
            .iter()
            .map(|p| PlannedRequest::Ready(text_request(p, "hola")))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_cap_is_respected() {
        let fake = Arc::new(FakeTransport::new().with_delay(Duration::from_millis(100)));
        let service = DispatchService::new(fake.clone(), 2, retry(3, 1000));

        let start = Instant::now();
        let report = service
            .dispatch(texts(&["1", "2", "3", "4", "5"]), false, |_, _| {})
            .await;
        let elapsed = start.elapsed();

        assert_eq!(report.total, 5);
        assert_eq!(report.results.len(), 5);
        assert_eq!(fake.calls(), 5);
        assert_eq!(fake.max_in_flight(), 2, "más de 2 en vuelo");
        // ceil(5/2) * 100ms
        assert!(
            elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(400),
            "tardó {:?}",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_is_refilled_without_waiting_for_batch() {
        // "1" es lento; los otros 3 deberían pasar por el segundo slot mientras tanto
        let fake = Arc::new(
            FakeTransport::new()
                .with_delay(Duration::from_millis(100))
                .with_delay_for("1", Duration::from_millis(350)),
        );
        let service = DispatchService::new(fake.clone(), 2, retry(1, 1000));

        let start = Instant::now();
        let report = service
            .dispatch(texts(&["1", "2", "3", "4"]), false, |_, _| {})
            .await;

        assert_eq!(report.succeeded(), 4);
        assert!(start.elapsed() < Duration::from_millis(400));
        assert_eq!(report.results.last().map(|r| r.phone.as_str()), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_arrive_in_completion_order() {
        let fake = Arc::new(
            FakeTransport::new()
                .with_delay_for("slow", Duration::from_millis(300))
                .with_delay_for("fast", Duration::from_millis(100)),
        );
        let service = DispatchService::new(fake, 10, retry(3, 1000));

        let report = service
            .dispatch(texts(&["slow", "fast"]), false, |_, _| {})
            .await;

        let order: Vec<_> = report.results.iter().map(|r| r.phone.as_str()).collect();
        assert_eq!(order, vec!["fast", "slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried_with_exponential_backoff() {
        let fake = Arc::new(
            FakeTransport::new().script("1", vec![Scripted::Transient, Scripted::Transient]),
        );
        let service = DispatchService::new(fake.clone(), 10, retry(3, 1000));

        let report = service.dispatch(texts(&["1"]), false, |_, _| {}).await;

        let result = &report.results[0];
        assert!(result.ok);
        assert_eq!(result.attempts, 3);
        assert_eq!(fake.calls(), 3);

        let times = fake.call_times("1");
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_yield_failed_result_without_aborting() {
        let fake = Arc::new(FakeTransport::new().script(
            "bad",
            vec![Scripted::Transient, Scripted::Transient, Scripted::Transient],
        ));
        let service = DispatchService::new(fake.clone(), 10, retry(3, 10));

        let report = service
            .dispatch(texts(&["bad", "good"]), false, |_, _| {})
            .await;

        assert!(report.is_complete());
        let bad = report.results.iter().find(|r| r.phone == "bad").expect("resultado de 'bad'");
        assert!(!bad.ok);
        assert_eq!(bad.attempts, 3);
        assert!(bad.error.as_deref().unwrap_or_default().contains("connection reset"));
        let good = report.results.iter().find(|r| r.phone == "good").expect("resultado de 'good'");
        assert!(good.ok);
        assert_eq!(fake.calls(), 4);
    }

    #[tokio::test]
    async fn test_rejected_response_is_not_retried() {
        let error_body = json!({"error": {"message": "Invalid parameter", "code": 100}});
        let fake = Arc::new(
            FakeTransport::new().with_fallback(Scripted::Respond(400, error_body.clone())),
        );
        let service = DispatchService::new(fake.clone(), 10, retry(3, 10));

        let report = service.dispatch(texts(&["1"]), false, |_, _| {}).await;

        let result = &report.results[0];
        assert!(!result.ok);
        assert_eq!(result.status, Some(400));
        assert_eq!(result.body.as_ref(), Some(&error_body));
        assert_eq!(result.attempts, 1);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_never_touches_transport() {
        let fake = Arc::new(FakeTransport::new().with_delay(Duration::from_secs(10)));
        let service = DispatchService::new(fake.clone(), 1, retry(3, 1000));

        let start = Instant::now();
        let report = service
            .dispatch(texts(&["1", "2", "3"]), true, |_, _| {})
            .await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(fake.calls(), 0);
        assert_eq!(report.total, 3);
        assert!(report.results.iter().all(|r| r.ok && r.dry_run));
        assert!(report.results.iter().all(|r| r.kind == MessageKind::Text));
    }

    #[tokio::test]
    async fn test_progress_is_reported_once_per_result_with_stable_total() {
        let fake = Arc::new(FakeTransport::new());
        let service = DispatchService::new(fake, 3, retry(3, 10));

        let mut seen = Vec::new();
        let report = service
            .dispatch(texts(&["1", "2", "3", "4"]), false, |done, total| {
                seen.push((done, total))
            })
            .await;

        assert_eq!(report.results.len(), 4);
        assert_eq!(seen, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[tokio::test]
    async fn test_invalid_request_fails_without_network_and_counts_in_total() {
        let fake = Arc::new(FakeTransport::new());
        let service = DispatchService::new(fake.clone(), 3, retry(3, 10));

        let mut requests = texts(&["1"]);
        requests.push(PlannedRequest::Invalid {
            recipient: "2".to_string(),
            kind: MessageKind::Text,
            error: DispatchError::MissingField {
                field: "name".to_string(),
            },
        });

        let report = service.dispatch(requests, false, |_, _| {}).await;

        assert_eq!(report.total, 2);
        assert_eq!(report.results.len(), 2);
        assert_eq!(fake.calls(), 1);
        let failed = report.results.iter().find(|r| r.phone == "2").expect("resultado de '2'");
        assert!(!failed.ok);
        assert_eq!(failed.attempts, 0);
        assert!(failed.error.as_deref().unwrap_or_default().contains("name"));
    }

    #[tokio::test]
    async fn test_empty_request_list_completes_immediately() {
        let fake = Arc::new(FakeTransport::new());
        let service = DispatchService::new(fake, 3, retry(3, 10));

        let mut calls = 0;
        let report = service.dispatch(Vec::new(), false, |_, _| calls += 1).await;

        assert_eq!(report.total, 0);
        assert!(report.is_complete());
        assert_eq!(calls, 0);
    }
}
