//! Configuration management for the Signal Graph engine.

mod sub_configs;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use sub_configs::{
    AdapterConfig, AlertConfig, AuditConfig, BudgetConfig, DecayConfig, GatingConfig,
    HorizonConfig, LoggingConfig, RthConfig, UniverseConfig, WeightConfig,
};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub gating: GatingConfig,
    pub decay: DecayConfig,
    pub weights: WeightConfig,
    pub horizon: HorizonConfig,
    pub rth: RthConfig,
    pub adapter: AdapterConfig,
    pub budget: BudgetConfig,
    pub universe: UniverseConfig,
    pub alerts: AlertConfig,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Sources are layered in order:
    /// 1. `config/default.toml` (base settings)
    /// 2. `config/{SIGNAL_GRAPH_ENV}.toml` (environment-specific)
    /// 3. Environment variables with `SIGNAL_GRAPH__` prefix
    pub fn load() -> CoreResult<Self> {
        let env = std::env::var("SIGNAL_GRAPH_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("SIGNAL_GRAPH").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!("failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CoreError::ConfigError(format!("failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults for tests and development.
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Validate configuration values. Fail fast: a bad configuration at
    /// startup is the one error class that should stop the process.
    pub fn validate(&self) -> CoreResult<()> {
        fn unit_interval(name: &str, v: f32) -> CoreResult<()> {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(CoreError::ConfigError(format!(
                    "{} must lie in [0, 1], got {}",
                    name, v
                )));
            }
            Ok(())
        }

        unit_interval("weights.alpha_blend", self.weights.alpha_blend)?;
        unit_interval("weights.initial_edge_weight", self.weights.initial_edge_weight)?;
        unit_interval("weights.min_confidence_to_add", self.weights.min_confidence_to_add)?;
        unit_interval("decay.prune_threshold", self.decay.prune_threshold)?;
        unit_interval("horizon.min_probability", self.horizon.min_probability)?;

        if self.weights.flip_margin < 0.0 || !self.weights.flip_margin.is_finite() {
            return Err(CoreError::ConfigError(format!(
                "weights.flip_margin must be non-negative, got {}",
                self.weights.flip_margin
            )));
        }

        for (name, minutes) in [
            ("decay.price_minutes", self.decay.price_minutes),
            ("decay.news_minutes", self.decay.news_minutes),
            ("decay.filing_minutes", self.decay.filing_minutes),
            ("decay.social_minutes", self.decay.social_minutes),
            ("decay.macro_minutes", self.decay.macro_minutes),
        ] {
            if !(minutes > 0.0) {
                return Err(CoreError::ConfigError(format!(
                    "{} must be positive, got {}",
                    name, minutes
                )));
            }
        }

        if self.gating.max_candidates_per_event == 0 {
            return Err(CoreError::ConfigError(
                "gating.max_candidates_per_event must be greater than 0".into(),
            ));
        }
        if self.gating.max_lag_minutes == 0 || self.gating.max_price_lag_minutes == 0 {
            return Err(CoreError::ConfigError(
                "gating lag ceilings must be greater than 0".into(),
            ));
        }

        if !(self.horizon.steepness > 0.0) {
            return Err(CoreError::ConfigError(format!(
                "horizon.steepness must be positive, got {}",
                self.horizon.steepness
            )));
        }
        if self.horizon.minutes == 0 {
            return Err(CoreError::ConfigError(
                "horizon.minutes must be greater than 0".into(),
            ));
        }

        if self.adapter.timeout_secs == 0 {
            return Err(CoreError::ConfigError(
                "adapter.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.budget.daily_judgment_cap == 0 {
            return Err(CoreError::ConfigError(
                "budget.daily_judgment_cap must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventKind;

    #[test]
    fn default_config_is_valid() {
        Config::default_config().validate().expect("defaults validate");
    }

    #[test]
    fn alpha_out_of_range_fails_validation() {
        let mut cfg = Config::default_config();
        cfg.weights.alpha_blend = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_half_life_fails_validation() {
        let mut cfg = Config::default_config();
        cfg.decay.news_minutes = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_fanout_cap_fails_validation() {
        let mut cfg = Config::default_config();
        cfg.gating.max_candidates_per_event = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn pair_half_life_takes_the_faster_endpoint() {
        let decay = DecayConfig::default();
        let pair = decay.pair_half_life_secs(EventKind::News, EventKind::Price);
        let price = decay.half_life_secs(EventKind::Price);
        assert_eq!(pair, price, "price is the faster-decaying endpoint");
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml = r#"
            [weights]
            alpha_blend = 0.5

            [rth]
            enforce = false
        "#;
        let cfg: Config = ::toml::from_str(toml).expect("parse partial config");
        assert_eq!(cfg.weights.alpha_blend, 0.5);
        assert!(!cfg.rth.enforce);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.horizon.minutes, 90);
        cfg.validate().expect("still valid");
    }
}
