//! Request pipeline integration tests

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;
    use crate::common::assertions::GovernedResponseAssertions;
    use crate::common::{MockBackend, fixtures};
    use governance_gateway::GovernanceError;
    use governance_gateway::core::budget::{BudgetCheck, UsageRecord};
    use governance_gateway::core::rate_limiter::{LimitTier, RateLimitDecision};
    use tokio_util::sync::CancellationToken;

    // ==================== Rate Limiting ====================

    /// Two checks pass, the third in the same minute is denied on the minute tier
    #[test]
    fn test_minute_limit_of_two() {
        let mut config = fixtures::config();
        config.rate_limit.tenant.per_minute = 2;
        let governor = fixtures::governor::<MockBackend>(config, Vec::new());

        assert!(governor.limiter().check("tenant-1").is_allowed());
        assert!(governor.limiter().check("tenant-1").is_allowed());
        match governor.limiter().check("tenant-1") {
            RateLimitDecision::Denied {
                tier, retry_after, ..
            } => {
                assert_eq!(tier, LimitTier::TenantMinute);
                assert_eq!(tier.as_str(), "minute");
                assert!(retry_after.as_secs() <= 60);
            }
            RateLimitDecision::Allowed => panic!("third check must be denied"),
        }

        // Other tenants keep their own counters
        assert!(governor.allow("tenant-2"));
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_exceed_limit() {
        let mut config = fixtures::config();
        config.rate_limit.tenant.per_minute = 5;
        let governor = fixtures::governor(config, vec![MockBackend::ok("primary", 10)]);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let governor = governor.clone();
                tokio::spawn(async move {
                    governor
                        .process(fixtures::request("busy"), &CancellationToken::new())
                        .await
                })
            })
            .collect();

        let mut allowed = 0;
        let mut denied = 0;
        for result in futures::future::join_all(handles).await {
            match result.expect("task panicked") {
                Ok(_) => allowed += 1,
                Err(GovernanceError::RateLimited { .. }) => denied += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
        assert_eq!(allowed, 5);
        assert_eq!(denied, 15);
        assert_eq!(governor.stats().rate_limited, 15);
    }

    // ==================== Cost ====================

    /// 700 input and 300 output units at 0.003/0.006 per 1k plus 0.1 fixed
    #[test]
    fn test_cost_estimate_from_rate_card() {
        let governor = fixtures::governor::<MockBackend>(fixtures::config(), Vec::new());

        let estimate = governor.estimate("primary", "weeknight", "tenant-1", 1000);

        assert_approx_eq!(estimate.input_units, 700.0);
        assert_approx_eq!(estimate.output_units, 300.0);
        assert_approx_eq!(estimate.cost, 0.1039);
        assert!(!estimate.minimum_applied);
    }

    #[test]
    fn test_volume_discounts_compound() {
        let mut config = fixtures::config();
        config
            .budget
            .rate_cards
            .insert("primary".to_string(), fixtures::discounted_card());
        let governor = fixtures::governor::<MockBackend>(config, Vec::new());

        governor.record(&UsageRecord {
            tenant_id: "heavy".to_string(),
            backend: "primary".to_string(),
            feature: "weeknight".to_string(),
            cost: 1.0,
            units: 2_500,
        });
        let estimate = governor.estimate("primary", "weeknight", "heavy", 1000);

        assert_approx_eq!(estimate.discount_multiplier, 0.9 * 0.8);
        assert_approx_eq!(estimate.cost, 0.1039 * 0.9 * 0.8);
    }

    #[test]
    fn test_zero_ceiling_is_unlimited() {
        let governor = fixtures::governor::<MockBackend>(fixtures::config(), Vec::new());

        governor.record(&UsageRecord {
            tenant_id: "tenant-1".to_string(),
            backend: "primary".to_string(),
            feature: "weeknight".to_string(),
            cost: 1_000_000.0,
            units: 1,
        });

        assert_eq!(governor.ledger().check_budget(), BudgetCheck::Ok);
        assert!(governor.ledger().get_alerts().is_empty());
    }

    // ==================== Quality Retry ====================

    /// 0.55 triggers one retry; the retry's 0.6 wins although still below 0.7
    #[tokio::test]
    async fn test_quality_retry_keeps_higher_score() {
        let primary = MockBackend::scripted(
            "primary",
            vec![
                fixtures::response(fixtures::recipe("first", 9), 500),
                fixtures::response(fixtures::recipe("retry", 8), 500),
                fixtures::response(fixtures::recipe("unused", 0), 500),
            ],
        );
        let governor = fixtures::governor(fixtures::config(), vec![primary.clone()]);

        let response = governor
            .process(fixtures::request("tenant-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(primary.calls(), 2);
        assert!(response.retried);
        assert_eq!(response.recipe.title, "retry");
        let quality = response.quality.as_ref().unwrap();
        assert_approx_eq!(quality.overall, 0.6);
        assert!(!quality.passed);
        response.assert_attributed_to("primary");

        let history = governor.quality().history("weeknight", 10);
        assert_eq!(history.len(), 2);
        assert_approx_eq!(history[1].overall, 0.55);
    }

    // ==================== Cache ====================

    #[tokio::test]
    async fn test_cache_hit_is_free_and_rate_limited() {
        let mut config = fixtures::config();
        config.cache.enabled = true;
        config.rate_limit.tenant.per_minute = 3;
        let primary = MockBackend::ok("primary", 1000);
        let governor = fixtures::governor(config, vec![primary.clone()]);
        let cancel = CancellationToken::new();

        let first = governor
            .process(fixtures::request("tenant-1"), &cancel)
            .await
            .unwrap();
        let second = governor
            .process(fixtures::request("tenant-1"), &cancel)
            .await
            .unwrap();

        assert!(!first.is_cached());
        assert!(second.is_cached());
        assert_eq!(second.recipe, first.recipe);
        assert_approx_eq!(second.total_cost(), 0.0);
        assert_eq!(primary.calls(), 1);
        assert_approx_eq!(governor.budget_status().daily_spend, 0.1039);
        assert_eq!(governor.tenant_status("tenant-1").windows[0].count, 2);

        // A different prompt misses the cache
        let other = governor
            .process(
                fixtures::request("tenant-1").with_constraint("diet", "vegan"),
                &cancel,
            )
            .await
            .unwrap();
        assert!(!other.is_cached());
        assert_eq!(primary.calls(), 2);
    }
}
