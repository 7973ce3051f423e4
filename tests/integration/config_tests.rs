//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use crate::common::{MockBackend, fixtures};
    use governance_gateway::config::GovernanceConfig;
    use governance_gateway::{Config, GovernanceError, Governor};
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = r#"
backends:
  primary: openai
  fallbacks: [anthropic]
  timeout_secs: 20
  timeouts:
    anthropic: 40
budget:
  daily_limit: 5000
  monthly_limit: 100000
  alert_thresholds: [0.5, 0.8, 1.0]
  rate_cards:
    openai:
      input_cost_per_1k: 0.003
      output_cost_per_1k: 0.006
      fixed_per_request: 0.1
      minimum_charge: 0.01
      volume_discounts:
        - threshold_units: 100000
          discount: 0.05
rate_limit:
  tenant:
    per_minute: 10
    per_hour: 200
    per_day: 1000
    monthly_quota: 500000
quality:
  min_score: 0.75
cache:
  enabled: false
alerting:
  channels:
    log:
      enabled: true
      min_severity: warning
"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    // ==================== File Loading ====================

    #[test]
    fn test_yaml_file_builds_governor() {
        let file = write_config(YAML);
        let config = tokio_test::block_on(Config::from_file(file.path())).unwrap();

        assert_eq!(config.backends().chain(), vec!["openai", "anthropic"]);
        assert_eq!(config.backends().timeout_for("anthropic").as_secs(), 40);
        assert_eq!(config.budget().daily_ceiling(), Some(50.0));
        assert_eq!(config.rate_limit().tenant.per_minute, 10);
        assert!(!config.cache().enabled);

        let governor = Governor::builder(config)
            .backend(MockBackend::ok("openai", 10))
            .build()
            .unwrap();
        assert!(governor.cache().is_none());
        assert_eq!(governor.quality().min_score(), 0.75);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = tokio_test::block_on(Config::from_file("/nonexistent/governor.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_round_trip_through_yaml() {
        let config = Config {
            governance: fixtures::config(),
        };
        let yaml = config.to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();

        assert_eq!(parsed.backends().chain(), config.backends().chain());
        assert_eq!(parsed.budget().rate_cards, config.budget().rate_cards);
    }

    // ==================== Validation ====================

    #[test]
    fn test_reserved_fallback_name_is_rejected() {
        let yaml = "backends:\n  primary: openai\n  fallbacks: [local]\n";
        let result = Config::from_yaml(yaml);

        match result {
            Err(GovernanceError::Config(message)) => assert!(message.contains("local")),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_webhook_url_is_rejected() {
        let yaml = r#"
alerting:
  channels:
    webhooks:
      - name: ops
        url: "not a url"
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    // ==================== Environment ====================

    #[test]
    fn test_environment_overrides() {
        let mut config = GovernanceConfig::default();
        let vars = HashMap::from([
            ("GOVERNOR_PRIMARY_BACKEND".to_string(), "anthropic".to_string()),
            (
                "GOVERNOR_FALLBACK_BACKENDS".to_string(),
                "openai, mistral".to_string(),
            ),
            ("GOVERNOR_DAILY_BUDGET".to_string(), "2500".to_string()),
            ("GOVERNOR_TENANT_PER_MINUTE".to_string(), "7".to_string()),
            ("GOVERNOR_MIN_QUALITY".to_string(), "0.8".to_string()),
        ]);

        config.apply_env(&vars).unwrap();

        assert_eq!(config.backends.chain(), vec!["anthropic", "openai", "mistral"]);
        assert_eq!(config.budget.daily_limit, 2500);
        assert_eq!(config.rate_limit.tenant.per_minute, 7);
        assert_eq!(config.quality.min_score, 0.8);
    }

    #[test]
    fn test_unparseable_environment_value() {
        let mut config = GovernanceConfig::default();
        let vars = HashMap::from([("GOVERNOR_DAILY_BUDGET".to_string(), "lots".to_string())]);

        assert!(matches!(
            config.apply_env(&vars),
            Err(GovernanceError::Config(_))
        ));
    }
}
