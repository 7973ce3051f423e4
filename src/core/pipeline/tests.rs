//! Request pipeline tests

#[cfg(test)]
mod tests {
    use super::super::governor::Governor;
    use super::super::types::PipelineStage;
    use crate::config::{Config, GovernanceConfig, RateCard};
    use crate::core::budget::{BudgetPeriod, UsageRecord};
    use crate::core::rate_limiter::LimitTier;
    use crate::core::router::{
        BackendError, GenerationBackend, GenerationRequest, GenerationResponse, GenerationSource,
    };
    use crate::core::types::{Ingredient, Recipe};
    use crate::monitoring::alerts::alert_types;
    use crate::monitoring::health::HealthState;
    use crate::utils::error::GovernanceError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    /// Replies from a script, then with `fallback_reply` (or an error)
    struct ScriptedBackend {
        name: String,
        script: Mutex<VecDeque<GenerationResponse>>,
        fallback_reply: Option<GenerationResponse>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn replying(name: &str, units: u64) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                script: Mutex::new(VecDeque::new()),
                fallback_reply: Some(response(clarity_recipe("Tomato Soup", 0), units)),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn scripted(name: &str, replies: Vec<GenerationResponse>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                script: Mutex::new(replies.into()),
                fallback_reply: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        /// Always replies with `reply` after sleeping `delay`
        fn delayed(name: &str, delay: Duration, reply: GenerationResponse) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                script: Mutex::new(VecDeque::new()),
                fallback_reply: Some(reply),
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &str) -> Arc<Self> {
            Self::scripted(name, Vec::new())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &str {
            &self.name
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
            _deadline: Instant,
        ) -> Result<GenerationResponse, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(reply) = self.script.lock().pop_front() {
                return Ok(reply);
            }
            self.fallback_reply
                .clone()
                .ok_or_else(|| BackendError::unavailable(&self.name, "503 Service Unavailable"))
        }
    }

    fn response(recipe: Recipe, units: u64) -> GenerationResponse {
        GenerationResponse {
            recipe,
            units_used: units,
        }
    }

    /// Recipe whose clarity score is `1.0 - 0.05 * hedges`
    fn clarity_recipe(title: &str, hedges: usize) -> Recipe {
        let mut instructions = vec![
            "Warm the olive oil in a large pot.".to_string(),
            "Add the tomatoes and stir well.".to_string(),
            "Simmer for twenty minutes, then blend.".to_string(),
        ];
        instructions.extend(std::iter::repeat_n(
            "Maybe stir the pot once more.".to_string(),
            hedges,
        ));
        Recipe {
            title: title.to_string(),
            ingredients: vec![Ingredient::new("tomatoes", 800.0, "g")],
            instructions,
            servings: Some(4),
            ..Recipe::default()
        }
    }

    fn openai_card() -> RateCard {
        RateCard {
            input_cost_per_1k: 0.003,
            output_cost_per_1k: 0.006,
            fixed_per_request: 0.1,
            minimum_charge: 0.01,
            volume_discounts: Vec::new(),
        }
    }

    /// Clarity-only quality, no cache, three-backend chain
    fn base_config() -> GovernanceConfig {
        let mut config = GovernanceConfig::default();
        config.backends.primary = "primary".to_string();
        config.backends.fallbacks = vec!["secondary".to_string(), "tertiary".to_string()];
        config.quality.weights = HashMap::from([("clarity".to_string(), 1.0)]);
        config.quality.min_score = 0.7;
        config.cache.enabled = false;
        for name in ["primary", "secondary", "tertiary"] {
            config.budget.rate_cards.insert(name.to_string(), openai_card());
        }
        config
    }

    fn governor(config: GovernanceConfig, backends: Vec<Arc<ScriptedBackend>>) -> Governor {
        let mut builder = Governor::builder(Config { governance: config }).channels(Vec::new());
        for backend in backends {
            builder = builder.backend(backend);
        }
        builder.build().unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("tenant-a", "recipe", "A warming tomato soup")
    }

    // ==== Happy Path Tests ====

    #[tokio::test]
    async fn test_primary_success_is_recorded() {
        let primary = ScriptedBackend::replying("primary", 1000);
        let governor = governor(base_config(), vec![primary.clone()]);

        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            response.source,
            GenerationSource::Primary {
                backend: "primary".to_string()
            }
        );
        assert!((response.confidence - 0.95).abs() < 1e-9);
        assert!(!response.retried);
        assert_eq!(response.billed.len(), 1);
        assert!((response.total_cost() - 0.1039).abs() < 1e-9);
        assert_eq!(
            response.stages,
            vec![
                PipelineStage::Pending,
                PipelineStage::Generating,
                PipelineStage::QualityChecked,
                PipelineStage::Recorded,
            ]
        );

        let spend = governor.ledger().tenant_spend("tenant-a").unwrap();
        assert!((spend.daily_spend - 0.1039).abs() < 1e-9);
        assert_eq!(spend.requests_today, 1);
        assert_eq!(primary.calls(), 1);

        let stats = governor.stats();
        assert_eq!(stats.requests, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failures, 0);
    }

    #[tokio::test]
    async fn test_disabled_quality_gate_skips_assessment() {
        let mut config = base_config();
        config.quality.enabled = false;
        let governor = governor(config, vec![ScriptedBackend::replying("primary", 10)]);

        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.quality.is_none());
        assert!(!response.stages.contains(&PipelineStage::QualityChecked));
        assert!(governor.quality().metrics("recipe").is_none());
    }

    // ==== Denial Tests ====

    #[tokio::test]
    async fn test_rate_limit_denies_third_request_in_minute() {
        let mut config = base_config();
        config.rate_limit.tenant.per_minute = 2;
        let primary = ScriptedBackend::replying("primary", 10);
        let governor = governor(config, vec![primary.clone()]);
        let cancel = CancellationToken::new();

        assert!(governor.process(request(), &cancel).await.is_ok());
        assert!(governor.process(request(), &cancel).await.is_ok());
        let err = governor.process(request(), &cancel).await.unwrap_err();

        match err {
            GovernanceError::RateLimited { tier, .. } => assert_eq!(tier, LimitTier::TenantMinute),
            other => panic!("expected rate limit denial, got {:?}", other),
        }
        assert_eq!(primary.calls(), 2);
        assert_eq!(governor.stats().rate_limited, 1);

        let violations: Vec<_> = governor
            .alerts()
            .active_alerts()
            .into_iter()
            .filter(|a| a.alert_type == alert_types::RATE_LIMIT_VIOLATION)
            .collect();
        assert_eq!(violations.len(), 1);
    }

    #[tokio::test]
    async fn test_budget_blocks_before_generation() {
        let mut config = base_config();
        // 0.01 in major units
        config.budget.daily_limit = 1;
        let primary = ScriptedBackend::replying("primary", 1000);
        let governor = governor(config, vec![primary.clone()]);
        let cancel = CancellationToken::new();

        governor.process(request(), &cancel).await.unwrap();
        let err = governor.process(request(), &cancel).await.unwrap_err();

        match err {
            GovernanceError::BudgetExceeded { period, limit, .. } => {
                assert_eq!(period, BudgetPeriod::Daily);
                assert!((limit - 0.01).abs() < 1e-9);
            }
            other => panic!("expected budget denial, got {:?}", other),
        }
        assert_eq!(primary.calls(), 1);
        assert_eq!(governor.stats().budget_blocked, 1);

        // One alert per daily threshold, not re-raised by the blocked request
        let cost_alerts = governor
            .alerts()
            .active_alerts()
            .into_iter()
            .filter(|a| a.alert_type == alert_types::COST_THRESHOLD)
            .count();
        assert_eq!(cost_alerts, 3);
    }

    // ==== Fallback Tests ====

    #[tokio::test]
    async fn test_second_fallback_is_attributed_cost() {
        let tertiary = ScriptedBackend::replying("tertiary", 1000);
        let governor = governor(
            base_config(),
            vec![
                ScriptedBackend::failing("primary"),
                ScriptedBackend::failing("secondary"),
                tertiary.clone(),
            ],
        );

        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            response.source,
            GenerationSource::Fallback {
                backend: "tertiary".to_string(),
                position: 2
            }
        );
        assert!((response.confidence - 0.75).abs() < 1e-9);
        assert!(response.stages.contains(&PipelineStage::Degraded));
        assert_eq!(response.attempts.len(), 3);
        assert_eq!(response.billed[0].backend, "tertiary");
        assert_eq!(response.billed[0].units, 1000);
        assert!((response.billed[0].cost - 0.1039).abs() < 1e-9);

        let report = governor.spend_report();
        let backends: Vec<&str> = report.by_backend.iter().map(|(b, _)| b.as_str()).collect();
        assert_eq!(backends, vec!["tertiary"]);
        assert_eq!(governor.stats().fallbacks, 1);
        assert_eq!(tertiary.calls(), 1);
    }

    #[tokio::test]
    async fn test_local_synthesis_is_free_and_not_cached() {
        let mut config = base_config();
        config.cache.enabled = true;
        config.quality.enabled = false;
        let primary = ScriptedBackend::failing("primary");
        let governor = governor(
            config,
            vec![
                primary.clone(),
                ScriptedBackend::failing("secondary"),
                ScriptedBackend::failing("tertiary"),
            ],
        );
        let cancel = CancellationToken::new();

        let response = governor.process(request(), &cancel).await.unwrap();
        assert_eq!(response.source, GenerationSource::LocalSynthesis);
        assert!((response.confidence - 0.4).abs() < 1e-9);
        assert_eq!(response.billed[0].backend, "local");
        assert_eq!(response.total_cost(), 0.0);

        let again = governor.process(request(), &cancel).await.unwrap();
        assert_eq!(again.source, GenerationSource::LocalSynthesis);
        assert_eq!(primary.calls(), 2);
        assert_eq!(governor.stats().local_syntheses, 2);
    }

    #[tokio::test]
    async fn test_all_backends_failed_without_local_synthesis() {
        let mut config = base_config();
        config.backends.fallbacks.clear();
        config.backends.local_synthesis = false;
        let governor = governor(config, vec![ScriptedBackend::failing("primary")]);

        let err = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            GovernanceError::AllBackendsFailed { attempts } => assert_eq!(attempts.len(), 1),
            other => panic!("expected AllBackendsFailed, got {:?}", other),
        }
        let stats = governor.stats();
        assert_eq!(stats.failures, 1);
        assert!((stats.error_rate() - 1.0).abs() < 1e-9);
        assert!(governor.ledger().tenant_spend("tenant-a").is_none());
    }

    #[tokio::test]
    async fn test_unregistered_primary_is_skipped() {
        let mut config = base_config();
        config.backends.primary = "ghost".to_string();
        config.backends.fallbacks = vec!["secondary".to_string()];
        let governor = governor(config, vec![ScriptedBackend::replying("secondary", 10)]);

        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.source.backend(), "secondary");
    }

    #[tokio::test]
    async fn test_cancelled_request_is_not_recorded() {
        let governor = governor(base_config(), vec![ScriptedBackend::replying("primary", 10)]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = governor.process(request(), &cancel).await.unwrap_err();

        assert!(matches!(err, GovernanceError::Cancelled));
        assert_eq!(governor.stats().cancelled, 1);
        assert!(governor.ledger().tenant_spend("tenant-a").is_none());
    }

    // ==== Quality Retry Tests ====

    #[tokio::test]
    async fn test_quality_retry_returns_higher_scoring_result() {
        let primary = ScriptedBackend::scripted(
            "primary",
            vec![
                response(clarity_recipe("first", 9), 100),
                response(clarity_recipe("second", 8), 100),
            ],
        );
        let governor = governor(base_config(), vec![primary.clone()]);

        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.retried);
        assert_eq!(primary.calls(), 2);
        assert_eq!(response.recipe.title, "second");
        let quality = response.quality.unwrap();
        assert!((quality.overall - 0.6).abs() < 1e-9);
        assert!(!quality.passed);
        assert!(response.stages.contains(&PipelineStage::Retried));

        // Both generations are billed
        assert_eq!(response.billed.len(), 2);
        assert_eq!(governor.ledger().tenant_spend("tenant-a").unwrap().requests_today, 2);
        assert_eq!(governor.stats().retries, 1);

        let quality_alerts = governor
            .alerts()
            .history(None)
            .into_iter()
            .filter(|a| a.alert_type == alert_types::QUALITY_THRESHOLD)
            .count();
        assert_eq!(quality_alerts, 1);
    }

    #[tokio::test]
    async fn test_quality_retry_keeps_first_when_retry_is_worse() {
        let primary = ScriptedBackend::scripted(
            "primary",
            vec![
                response(clarity_recipe("first", 8), 100),
                response(clarity_recipe("second", 9), 100),
            ],
        );
        let governor = governor(base_config(), vec![primary.clone()]);

        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.retried);
        assert_eq!(response.recipe.title, "first");
        assert!((response.quality.unwrap().overall - 0.6).abs() < 1e-9);
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_retry_keeps_first_result() {
        let mut config = base_config();
        config.backends.fallbacks.clear();
        config.backends.local_synthesis = false;
        let primary =
            ScriptedBackend::scripted("primary", vec![response(clarity_recipe("first", 9), 100)]);
        let governor = governor(config, vec![primary.clone()]);

        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.retried);
        assert_eq!(response.recipe.title, "first");
        assert_eq!(response.billed.len(), 1);
        assert_eq!(governor.stats().failures, 0);
    }

    #[tokio::test]
    async fn test_quality_retry_shares_the_request_deadline() {
        let mut config = base_config();
        config.backends.fallbacks.clear();
        config.backends.local_synthesis = false;
        config.backends.request_deadline_secs = 1;
        let primary = ScriptedBackend::delayed(
            "primary",
            Duration::from_millis(700),
            response(clarity_recipe("slow", 9), 100),
        );
        let governor = governor(config, vec![primary.clone()]);

        let started = Instant::now();
        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(1300));
        assert!(response.retried);
        assert_eq!(response.billed.len(), 1);
        assert_eq!(primary.calls(), 2);
        let retry = response.attempts.last().unwrap();
        assert!(retry.error.as_ref().unwrap().is_timeout());
        assert!(retry.latency < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_passing_result_is_not_retried() {
        let primary = ScriptedBackend::replying("primary", 10);
        let governor = governor(base_config(), vec![primary.clone()]);

        let response = governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!response.retried);
        assert!(response.quality.unwrap().passed);
        assert_eq!(primary.calls(), 1);
    }

    // ==== Cache Tests ====

    #[tokio::test]
    async fn test_cache_hit_skips_cost_but_not_rate_limit() {
        let mut config = base_config();
        config.cache.enabled = true;
        config.rate_limit.tenant.per_minute = 2;
        let primary = ScriptedBackend::replying("primary", 1000);
        let governor = governor(config, vec![primary.clone()]);
        let cancel = CancellationToken::new();

        governor.process(request(), &cancel).await.unwrap();
        let cached = governor.process(request(), &cancel).await.unwrap();

        assert!(cached.is_cached());
        assert!((cached.confidence - 0.9).abs() < 1e-9);
        assert!(cached.billed.is_empty());
        assert_eq!(cached.stages, vec![PipelineStage::Pending, PipelineStage::CacheHit]);
        assert_eq!(primary.calls(), 1);
        assert_eq!(governor.ledger().tenant_spend("tenant-a").unwrap().requests_today, 1);
        assert_eq!(governor.stats().cache_hits, 1);

        let err = governor.process(request(), &cancel).await.unwrap_err();
        assert!(err.is_denied());
    }

    #[tokio::test]
    async fn test_low_quality_result_is_not_cached() {
        let mut config = base_config();
        config.cache.enabled = true;
        config.quality.retry_on_low_score = false;
        let primary = ScriptedBackend::scripted(
            "primary",
            vec![
                response(clarity_recipe("first", 9), 10),
                response(clarity_recipe("second", 0), 10),
            ],
        );
        let governor = governor(config, vec![primary.clone()]);
        let cancel = CancellationToken::new();

        let first = governor.process(request(), &cancel).await.unwrap();
        assert!(!first.quality.unwrap().passed);
        let second = governor.process(request(), &cancel).await.unwrap();

        assert!(!second.is_cached());
        assert_eq!(second.recipe.title, "second");
        assert_eq!(primary.calls(), 2);
    }

    // ==== Quota Tests ====

    #[tokio::test]
    async fn test_quota_exhaustion_alerts_once_then_denies() {
        let mut config = base_config();
        config.rate_limit.tenant.monthly_quota = 1500;
        let governor = governor(config, vec![ScriptedBackend::replying("primary", 1000)]);
        let cancel = CancellationToken::new();

        governor.process(request(), &cancel).await.unwrap();
        governor.process(request(), &cancel).await.unwrap();
        let quota_alerts = || {
            governor
                .alerts()
                .history(None)
                .into_iter()
                .filter(|a| a.alert_type == alert_types::RATE_LIMIT_VIOLATION)
                .count()
        };
        assert_eq!(quota_alerts(), 1);

        let err = governor.process(request(), &cancel).await.unwrap_err();
        match err {
            GovernanceError::RateLimited { tier, .. } => assert_eq!(tier, LimitTier::Quota),
            other => panic!("expected quota denial, got {:?}", other),
        }
        assert_eq!(quota_alerts(), 2);
    }

    // ==== Outbound Operation Tests ====

    #[tokio::test]
    async fn test_estimate_and_record_raise_cost_alerts() {
        let mut config = base_config();
        config.budget.daily_limit = 100;
        let governor = governor(config, Vec::new());

        let estimate = governor.estimate("primary", "recipe", "tenant-b", 1000);
        assert!((estimate.cost - 0.1039).abs() < 1e-9);

        let raised = governor.record(&UsageRecord {
            tenant_id: "tenant-b".to_string(),
            backend: "primary".to_string(),
            feature: "recipe".to_string(),
            cost: 0.75,
            units: 1000,
        });
        assert_eq!(raised.len(), 1);
        assert!(governor.budget_status().daily_utilization.unwrap() >= 0.7);
    }

    #[tokio::test]
    async fn test_allow_counts_against_limits() {
        let mut config = base_config();
        config.rate_limit.tenant.per_minute = 1;
        let governor = governor(config, Vec::new());

        assert!(governor.allow("tenant-c"));
        assert!(!governor.allow("tenant-c"));
        assert!(governor.allow("tenant-d"));
        assert_eq!(governor.tenant_status("tenant-c").windows[0].count, 1);
    }

    #[tokio::test]
    async fn test_alert_lifecycle_through_governor() {
        let governor = governor(base_config(), Vec::new());

        let alert = governor.raise(
            "custom",
            crate::monitoring::types::AlertSeverity::Warning,
            "Manual alert",
            "Raised by an operator",
            "operator",
            serde_json::json!({}),
        );
        governor.acknowledge(&alert.id, "ops").unwrap();
        let resolved = governor.resolve(&alert.id, "ops").unwrap();

        assert!(resolved.is_resolved());
        assert!(governor.alerts().active_alerts().is_empty());
        assert!(governor.resolve("missing", "ops").is_err());
    }

    #[tokio::test]
    async fn test_health_check_covers_every_component() {
        let governor = governor(base_config(), vec![ScriptedBackend::replying("primary", 10)]);
        governor
            .process(request(), &CancellationToken::new())
            .await
            .unwrap();

        let report = governor.health_check();

        assert_eq!(report.summary.total_components, 5);
        assert_eq!(report.status, HealthState::Healthy);
        assert!(report.component("generation").is_some());
    }

    // ==== Builder Tests ====

    #[test]
    fn test_builder_rejects_reserved_backend_name() {
        let result = Governor::builder(Config {
            governance: base_config(),
        })
        .channels(Vec::new())
        .backend(ScriptedBackend::replying("local", 1))
        .build();

        assert!(matches!(result, Err(GovernanceError::Config(_))));
    }

    #[test]
    fn test_builder_validates_config() {
        let mut config = base_config();
        config.quality.min_score = 1.5;

        let result = Governor::builder(Config { governance: config })
            .channels(Vec::new())
            .build();

        assert!(matches!(result, Err(GovernanceError::Config(_))));
    }
}
