use crate::{
    error::{SimError, SimResult},
    probability::EventRate,
    time_unit::TimeUnit,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Virtual-to-real time scale for the scheduler, plus the metrics lane settings.
///
/// Immutable once handed to a scheduler; changes go through
/// `reconfigure()` and take effect on the next `start()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Real microseconds that stand in for one virtual hour.
    pub micros_per_virtual_hour: u64,
    /// Explicit per-unit delays, replacing the scaled value for that unit.
    pub delay_overrides_micros: BTreeMap<TimeUnit, u64>,
    pub display_metrics: bool,
    pub metrics_interval_ms: u64,
    /// How long stop() waits for an in-flight tick.
    pub stop_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            micros_per_virtual_hour: 1_000_000, // 1 virtual hour per real second
            delay_overrides_micros:  BTreeMap::new(),
            display_metrics:         false,
            metrics_interval_ms:     5_000,
            stop_timeout_ms:         60_000,
        }
    }
}

impl SchedulerConfig {
    /// Real delay between two ticks of a runner bound to `unit`.
    /// Never shorter than one microsecond.
    pub fn delay_for(&self, unit: TimeUnit) -> Duration {
        if let Some(&micros) = self.delay_overrides_micros.get(&unit) {
            return Duration::from_micros(micros.max(1));
        }
        let scaled = u128::from(self.micros_per_virtual_hour) * u128::from(unit.seconds())
            / u128::from(TimeUnit::Hour.seconds());
        let micros = u64::try_from(scaled).unwrap_or(u64::MAX).max(1);
        Duration::from_micros(micros)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.micros_per_virtual_hour == 0 {
            return Err(SimError::InvalidConfig(
                "micros_per_virtual_hour must be > 0".into(),
            ));
        }
        if let Some((unit, _)) = self.delay_overrides_micros.iter().find(|(_, micros)| **micros == 0) {
            return Err(SimError::InvalidConfig(format!(
                "delay override for {unit} must be > 0"
            )));
        }
        if self.stop_timeout_ms == 0 {
            return Err(SimError::InvalidConfig("stop_timeout_ms must be > 0".into()));
        }
        if self.display_metrics && self.metrics_interval_ms == 0 {
            return Err(SimError::InvalidConfig(
                "metrics_interval_ms must be > 0 when metrics are displayed".into(),
            ));
        }
        Ok(())
    }
}

/// A rate as written in config. Counts are signed so that a negative
/// value is reported as an invalid rate rather than a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSpec {
    pub count: i64,
    pub per:   TimeUnit,
}

impl RateSpec {
    pub const fn new(count: i64, per: TimeUnit) -> Self {
        Self { count, per }
    }

    pub fn to_rate(self) -> SimResult<EventRate> {
        EventRate::new(self.count, self.per)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// New customers acquired, before demand scaling.
    pub new_customer: RateSpec,
    /// Orders placed per existing customer, before demand scaling.
    pub new_order: RateSpec,
    /// Delivery creation attempts per open order.
    pub new_delivery: RateSpec,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            new_customer: RateSpec::new(2, TimeUnit::Day),
            new_order:    RateSpec::new(1, TimeUnit::Week),
            new_delivery: RateSpec::new(3, TimeUnit::Day),
        }
    }
}

/// Validated rates, ready for simulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rates {
    pub new_customer: EventRate,
    pub new_order:    EventRate,
    pub new_delivery: EventRate,
}

impl RateConfig {
    pub fn validate(&self) -> SimResult<Rates> {
        Ok(Rates {
            new_customer: self.new_customer.to_rate()?,
            new_order:    self.new_order.to_rate()?,
            new_delivery: self.new_delivery.to_rate()?,
        })
    }
}

/// Sizes for the bootstrap scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub products_per_type: usize,
    pub customers:         usize,
    pub max_orders_per_customer: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            products_per_type:       200,
            customers:               10,
            max_orders_per_customer: 5,
        }
    }
}

/// Everything a session needs, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed:      u64,
    pub scheduler: SchedulerConfig,
    pub rates:     RateConfig,
    pub scenario:  ScenarioConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:      42,
            scheduler: SchedulerConfig::default(),
            rates:     RateConfig::default(),
            scenario:  ScenarioConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.scheduler.validate()?;
        config.rates.validate()?;
        Ok(config)
    }

    /// Small world, sub-millisecond ticks, fixed seed.
    pub fn default_test() -> Self {
        Self {
            seed: 0xC0FF_EE00,
            scheduler: SchedulerConfig {
                micros_per_virtual_hour: 500,
                delay_overrides_micros:  BTreeMap::new(),
                display_metrics:         false,
                metrics_interval_ms:     20,
                stop_timeout_ms:         2_000,
            },
            rates: RateConfig::default(),
            scenario: ScenarioConfig {
                products_per_type:       10,
                customers:               8,
                max_orders_per_customer: 3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_scales_with_unit() {
        let cfg = SchedulerConfig {
            micros_per_virtual_hour: 3_600,
            ..SchedulerConfig::default()
        };
        assert_eq!(cfg.delay_for(TimeUnit::Hour), Duration::from_micros(3_600));
        assert_eq!(cfg.delay_for(TimeUnit::Day), Duration::from_micros(86_400));
        assert_eq!(cfg.delay_for(TimeUnit::Second), Duration::from_micros(1));
    }

    #[test]
    fn sub_microsecond_delays_are_clamped() {
        let cfg = SchedulerConfig {
            micros_per_virtual_hour: 100,
            ..SchedulerConfig::default()
        };
        assert_eq!(cfg.delay_for(TimeUnit::Second), Duration::from_micros(1));
    }

    #[test]
    fn override_wins_over_scale() {
        let mut cfg = SchedulerConfig::default();
        cfg.delay_overrides_micros.insert(TimeUnit::Day, 250);
        assert_eq!(cfg.delay_for(TimeUnit::Day), Duration::from_micros(250));
        assert_eq!(cfg.delay_for(TimeUnit::Hour), Duration::from_secs(1));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let cfg = SchedulerConfig {
            micros_per_virtual_hour: 0,
            ..SchedulerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn zero_stop_timeout_is_rejected() {
        let cfg = SchedulerConfig {
            stop_timeout_ms: 0,
            ..SchedulerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));
        assert!(SchedulerConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_rate_in_config_is_an_invalid_rate() {
        let rates = RateConfig {
            new_order: RateSpec::new(-4, TimeUnit::Day),
            ..RateConfig::default()
        };
        assert!(matches!(rates.validate(), Err(SimError::InvalidRate { count: -4 })));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "seed": 7, "scheduler": { "display_metrics": true } }"#;
        let cfg: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.seed, 7);
        assert!(cfg.scheduler.display_metrics);
        assert_eq!(cfg.scheduler.metrics_interval_ms, 5_000);
        assert_eq!(cfg.rates, RateConfig::default());
    }
}
