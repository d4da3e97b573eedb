use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Alert thresholds for resource and request metrics
///
/// Set once at construction and read-only afterwards. Values are
/// percentages except `response_time_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Maximum CPU utilization (percent)
    pub cpu_percent: f64,
    /// Maximum memory utilization (percent)
    pub memory_percent: f64,
    /// Maximum disk utilization (percent)
    pub disk_percent: f64,
    /// Response time above which a request counts as slow (milliseconds)
    pub response_time_ms: f64,
    /// Maximum tolerated error rate (percent)
    pub error_rate_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 80.0,
            memory_percent: 85.0,
            disk_percent: 90.0,
            response_time_ms: 5000.0,
            error_rate_percent: 10.0,
        }
    }
}

impl AlertThresholds {
    /// Build thresholds from environment variables, falling back to the
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cpu_percent: env_f64("ALERT_CPU_PERCENT", defaults.cpu_percent),
            memory_percent: env_f64("ALERT_MEMORY_PERCENT", defaults.memory_percent),
            disk_percent: env_f64("ALERT_DISK_PERCENT", defaults.disk_percent),
            response_time_ms: env_f64("ALERT_RESPONSE_TIME_MS", defaults.response_time_ms),
            error_rate_percent: env_f64("ALERT_ERROR_RATE_PERCENT", defaults.error_rate_percent),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// An external dependency to probe for reachability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEndpoint {
    pub name: String,
    pub url: String,
}

impl DependencyEndpoint {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Monitoring configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between sampling cycles
    pub sample_interval: Duration,
    /// Measurement window for the CPU utilization read
    pub cpu_sample_window: Duration,
    /// Timeout for a single dependency probe
    pub probe_timeout: Duration,
    /// Timeout for a single metric-store call
    pub store_timeout: Duration,
    /// Maximum number of retained response time samples
    pub response_window_capacity: usize,
    /// Alert thresholds
    pub thresholds: AlertThresholds,
    /// External dependencies to probe
    pub dependencies: Vec<DependencyEndpoint>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(60),
            cpu_sample_window: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(10),
            store_timeout: Duration::from_secs(10),
            response_window_capacity: 100,
            thresholds: AlertThresholds::default(),
            dependencies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let thresholds = AlertThresholds::default();

        assert_eq!(thresholds.cpu_percent, 80.0);
        assert_eq!(thresholds.memory_percent, 85.0);
        assert_eq!(thresholds.disk_percent, 90.0);
        assert_eq!(thresholds.response_time_ms, 5000.0);
        assert_eq!(thresholds.error_rate_percent, 10.0);
    }

    #[test]
    fn test_thresholds_from_env() {
        std::env::set_var("ALERT_CPU_PERCENT", "70.5");
        std::env::set_var("ALERT_MEMORY_PERCENT", "not-a-number");

        let thresholds = AlertThresholds::from_env();
        assert_eq!(thresholds.cpu_percent, 70.5);
        // Unparseable values fall back to the default
        assert_eq!(thresholds.memory_percent, 85.0);
        // Unset values fall back to the default
        assert_eq!(thresholds.disk_percent, 90.0);

        std::env::remove_var("ALERT_CPU_PERCENT");
        std::env::remove_var("ALERT_MEMORY_PERCENT");
    }

    #[test]
    fn test_monitor_config_default() {
        let config = MonitorConfig::default();

        assert_eq!(config.sample_interval, Duration::from_secs(60));
        assert_eq!(config.probe_timeout, Duration::from_secs(10));
        assert_eq!(config.response_window_capacity, 100);
        assert!(config.dependencies.is_empty());
    }

    #[test]
    fn test_monitor_config_custom() {
        let mut config = MonitorConfig::default();
        config.sample_interval = Duration::from_millis(500);
        config.dependencies
            .push(DependencyEndpoint::new("search", "http://localhost:9200"));

        assert_eq!(config.sample_interval, Duration::from_millis(500));
        assert_eq!(config.dependencies.len(), 1);
        assert_eq!(config.dependencies[0].name, "search");
    }
}
