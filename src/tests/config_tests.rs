//! tests/config_tests.rs

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::whatsapp_config::{RetryPolicy, WhatsAppConfig, DEFAULT_CONCURRENCY};
    use crate::errors::DispatchError;

    #[test]
    fn test_config_builds_endpoint_urls() {
        let cfg = WhatsAppConfig::new("tok", "12345", "v17.0")
            .unwrap()
            .with_api_base("http://localhost:9999/");

        assert_eq!(cfg.messages_url(), "http://localhost:9999/v17.0/12345/messages");
        assert_eq!(cfg.media_url(), "http://localhost:9999/v17.0/12345/media");
        assert_eq!(cfg.auth_header(), "Bearer tok");
        assert_eq!(cfg.concurrency_limit, DEFAULT_CONCURRENCY);
        assert_eq!(cfg.retry, RetryPolicy::default());
    }

    #[test]
    fn test_config_fails_fast_on_missing_fields() {
        assert!(matches!(
            WhatsAppConfig::new("", "12345", "v17.0"),
            Err(DispatchError::Config(_))
        ));
        assert!(matches!(
            WhatsAppConfig::new("tok", "  ", "v17.0"),
            Err(DispatchError::Config(_))
        ));

        let cfg = WhatsAppConfig::new("tok", "12345", "v17.0").unwrap();
        assert!(cfg.clone().with_concurrency(0).validate().is_err());
        let no_retries = RetryPolicy {
            retries: 0,
            initial_backoff: Duration::from_secs(1),
        };
        assert!(cfg.with_retry(no_retries).validate().is_err());
    }

    #[test]
    fn test_backoff_doubles_each_attempt() {
        let policy = RetryPolicy {
            retries: 4,
            initial_backoff: Duration::from_millis(500),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(2000));
    }
}
