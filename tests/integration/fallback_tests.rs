//! Fallback integration tests over real HTTP

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;
    use crate::common::assertions::GovernedResponseAssertions;
    use crate::common::{HttpBackend, MockBackend, fixtures};
    use governance_gateway::{BackendError, GenerationSource, GovernanceError, PipelineStage};
    use serde_json::json;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_replying(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn recipe_body(units: u64) -> serde_json::Value {
        json!({
            "recipe": fixtures::recipe("From tertiary", 0),
            "units_used": units,
        })
    }

    // ==================== Ordered Fallback ====================

    /// Primary and first fallback fail; the second fallback is credited
    #[tokio::test]
    async fn test_second_fallback_over_http() {
        let primary = server_replying(ResponseTemplate::new(503)).await;
        let secondary = server_replying(ResponseTemplate::new(500)).await;
        let tertiary =
            server_replying(ResponseTemplate::new(200).set_body_json(recipe_body(1000))).await;

        let governor = fixtures::governor(
            fixtures::config(),
            vec![
                HttpBackend::new("primary", &primary.uri()),
                HttpBackend::new("secondary", &secondary.uri()),
                HttpBackend::new("tertiary", &tertiary.uri()),
            ],
        );

        let response = governor
            .process(fixtures::request("tenant-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            response.source,
            GenerationSource::Fallback {
                backend: "tertiary".to_string(),
                position: 2,
            }
        );
        response.assert_attributed_to("tertiary");
        response.assert_degraded();
        assert_eq!(response.recipe.title, "From tertiary");
        assert_approx_eq!(response.total_cost(), 0.1039);

        let failures: Vec<_> = response
            .attempts
            .iter()
            .filter_map(|a| a.error.as_ref())
            .map(|e| e.backend().to_string())
            .collect();
        assert_eq!(failures, vec!["primary", "secondary"]);

        let backends = governor.orchestrator().backend_stats();
        assert_eq!(backends["primary"].failures, 1);
        assert_eq!(backends["tertiary"].successes, 1);
    }

    #[tokio::test]
    async fn test_backend_errors_are_classified() {
        let throttled = server_replying(ResponseTemplate::new(429)).await;
        let garbled =
            server_replying(ResponseTemplate::new(200).set_body_string("not json")).await;
        let healthy =
            server_replying(ResponseTemplate::new(200).set_body_json(recipe_body(10))).await;

        let governor = fixtures::governor(
            fixtures::config(),
            vec![
                HttpBackend::new("primary", &throttled.uri()),
                HttpBackend::new("secondary", &garbled.uri()),
                HttpBackend::new("tertiary", &healthy.uri()),
            ],
        );

        let response = governor
            .process(fixtures::request("tenant-1"), &CancellationToken::new())
            .await
            .unwrap();

        let errors: Vec<&BackendError> =
            response.attempts.iter().filter_map(|a| a.error.as_ref()).collect();
        assert!(matches!(errors[0], BackendError::RateLimited { .. }));
        assert!(matches!(errors[1], BackendError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_every_backend_down_degrades_to_local() {
        let down = server_replying(ResponseTemplate::new(503)).await;
        let governor = fixtures::governor(
            fixtures::config(),
            vec![
                HttpBackend::new("primary", &down.uri()),
                HttpBackend::new("secondary", &down.uri()),
                HttpBackend::new("tertiary", &down.uri()),
            ],
        );

        let response = governor
            .process(
                governance_gateway::GenerationRequest::new("tenant-1", "weeknight", "lemon chicken"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.source, GenerationSource::LocalSynthesis);
        assert!(response.stages.contains(&PipelineStage::Degraded));
        assert!(response.recipe.title.to_lowercase().contains("chicken"));
        assert_approx_eq!(response.total_cost(), 0.0);
        assert_approx_eq!(response.confidence, 0.4);
    }

    // ==================== Deadlines and Cancellation ====================

    #[tokio::test]
    async fn test_slow_primary_times_out_into_fallback() {
        let mut config = fixtures::config();
        config.backends.timeouts.insert("primary".to_string(), 1);
        let primary = MockBackend::slow("primary", Duration::from_secs(10));
        let secondary = MockBackend::ok("secondary", 10);
        let governor = fixtures::governor(config, vec![primary, secondary.clone()]);

        let started = std::time::Instant::now();
        let response = governor
            .process(fixtures::request("tenant-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        response.assert_attributed_to("secondary");
        assert!(response.attempts[0].error.as_ref().unwrap().is_timeout());
        assert_eq!(secondary.calls(), 1);
    }

    /// The request deadline is shared, not renewed per fallback
    #[tokio::test]
    async fn test_shared_deadline_bounds_whole_chain() {
        let mut config = fixtures::config();
        config.backends.request_deadline_secs = 1;
        let governor = fixtures::governor(
            config,
            vec![
                MockBackend::slow("primary", Duration::from_secs(10)),
                MockBackend::slow("secondary", Duration::from_secs(10)),
                MockBackend::slow("tertiary", Duration::from_secs(10)),
            ],
        );

        let started = std::time::Instant::now();
        let response = governor
            .process(fixtures::request("tenant-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(response.source, GenerationSource::LocalSynthesis);
    }

    #[tokio::test]
    async fn test_cancellation_stops_in_flight_generation() {
        let primary = MockBackend::slow("primary", Duration::from_secs(10));
        let governor = fixtures::governor(fixtures::config(), vec![primary]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = governor
            .process(fixtures::request("tenant-1"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, GovernanceError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(governor.stats().cancelled, 1);
        assert!(governor.ledger().tenant_spend("tenant-1").is_none());
    }
}
