//! Alerting integration tests

#[cfg(test)]
mod tests {
    use crate::common::{MockBackend, fixtures};
    use governance_gateway::config::{GovernanceConfig, WebhookChannelConfig};
    use governance_gateway::monitoring::alerts::{SIGNATURE_HEADER, SuppressionRule, alert_types};
    use governance_gateway::{AlertSeverity, Config, GovernanceError, Governor};
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Config whose daily ceiling of 0.10 is crossed by a single request
    fn tight_budget(webhook_url: &str) -> GovernanceConfig {
        let mut config = fixtures::config();
        config.budget.daily_limit = 10;
        config.alerting.channels.webhooks = vec![WebhookChannelConfig {
            name: "ops".to_string(),
            url: webhook_url.to_string(),
            secret: Some("hook-secret".to_string()),
            headers: HashMap::from([("X-Team".to_string(), "kitchen".to_string())]),
            min_severity: AlertSeverity::Info,
        }];
        config
    }

    fn governor_with_configured_channels(config: GovernanceConfig) -> Governor {
        Governor::builder(Config { governance: config })
            .backend(MockBackend::ok("primary", 1000))
            .build()
            .expect("config is valid")
    }

    // ==================== Suppression ====================

    /// A suppressed violation is kept in history but never becomes active
    #[tokio::test]
    async fn test_suppressed_rate_limit_violation() {
        let mut config = fixtures::config();
        config.rate_limit.tenant.per_minute = 1;
        let governor = fixtures::governor(config, vec![MockBackend::ok("primary", 10)]);
        governor.alerts().add_suppression(SuppressionRule::new(
            alert_types::RATE_LIMIT_VIOLATION,
            chrono::Duration::hours(1),
            "maintenance",
        ));

        let cancel = CancellationToken::new();
        assert!(governor.process(fixtures::request("t1"), &cancel).await.is_ok());
        let denied = governor.process(fixtures::request("t1"), &cancel).await;
        assert!(matches!(denied, Err(GovernanceError::RateLimited { .. })));

        assert!(governor.alerts().active_alerts().is_empty());
        let history = governor.alerts().history(None);
        let violation = history
            .iter()
            .find(|a| a.alert_type == alert_types::RATE_LIMIT_VIOLATION)
            .expect("violation recorded");
        assert!(violation.suppressed);
        assert!(!violation.active);
        assert_eq!(governor.alerts().stats().suppressed_alerts, 1);
        assert!(governor.alerts().queue().is_empty());
    }

    /// An unsuppressed violation is active and queued for delivery
    #[tokio::test]
    async fn test_rate_limit_violation_is_active() {
        let mut config = fixtures::config();
        config.rate_limit.tenant.per_minute = 1;
        let governor = fixtures::governor(config, vec![MockBackend::ok("primary", 10)]);

        let cancel = CancellationToken::new();
        let _ = governor.process(fixtures::request("t1"), &cancel).await;
        let _ = governor.process(fixtures::request("t1"), &cancel).await;

        let active = governor.alerts().active_alerts();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].alert_type, alert_types::RATE_LIMIT_VIOLATION);
        assert_eq!(active[0].metadata["tenant_id"], "t1");
        assert_eq!(governor.alerts().queue().len(), 1);
    }

    // ==================== Webhook Delivery ====================

    /// A budget breach reaches the configured webhook, signed
    #[tokio::test]
    async fn test_budget_breach_delivered_to_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/alerts"))
            .and(header_exists(SIGNATURE_HEADER))
            .and(header_exists("X-Team"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let governor =
            governor_with_configured_channels(tight_budget(&format!("{}/hooks/alerts", server.uri())));
        let response = governor
            .process(fixtures::request("t1"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(response.total_cost() > 0.10);

        let processed = governor.alerts().process_pending().await;
        assert!(processed >= 1);

        let received = server.received_requests().await.unwrap_or_default();
        assert_eq!(received.len(), processed);
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["event"], "alert");
        assert_eq!(body["alert"]["alert_type"], alert_types::COST_THRESHOLD);

        let stats = governor.alerts().stats();
        assert!(stats.notifications_sent >= processed as u64);
        assert_eq!(stats.failed_notifications, 0);

        // Over the ceiling, the next request is blocked
        let blocked = governor
            .process(fixtures::request("t2"), &CancellationToken::new())
            .await;
        assert!(matches!(blocked, Err(GovernanceError::BudgetExceeded { .. })));
    }

    /// A failing webhook is recorded on the alert and never fails the request
    #[tokio::test]
    async fn test_failing_webhook_does_not_fail_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let governor = governor_with_configured_channels(tight_budget(&server.uri()));
        assert!(
            governor
                .process(fixtures::request("t1"), &CancellationToken::new())
                .await
                .is_ok()
        );

        governor.alerts().process_pending().await;

        let stats = governor.alerts().stats();
        assert!(stats.failed_notifications >= 1);
        let alert = governor
            .alerts()
            .active_alerts()
            .into_iter()
            .find(|a| a.alert_type == alert_types::COST_THRESHOLD)
            .expect("cost alert active");
        let webhook_attempt = alert
            .notifications
            .iter()
            .find(|n| n.channel == "ops")
            .expect("webhook attempted");
        assert!(!webhook_attempt.success);
        assert!(webhook_attempt.error.as_deref().unwrap_or_default().contains("500"));
    }

    // ==================== Worker ====================

    /// The background worker delivers queued alerts and stops on cancel
    #[tokio::test]
    async fn test_worker_delivers_in_background() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let governor = governor_with_configured_channels(tight_budget(&server.uri()));
        let shutdown = CancellationToken::new();
        let workers = governor.start(shutdown.clone());

        governor
            .process(fixtures::request("t1"), &CancellationToken::new())
            .await
            .unwrap();

        let delivered = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if !server.received_requests().await.unwrap_or_default().is_empty() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        assert!(delivered.is_ok(), "worker never delivered the alert");

        shutdown.cancel();
        for result in futures::future::join_all(workers).await {
            assert!(result.is_ok());
        }
        assert!(governor.alerts().queue().is_empty());
    }
}
