use crate::alerts::Alert;
use crate::config::AlertThresholds;
use crate::metrics::HealthMetrics;

/// Evaluates sampled metrics against the configured limits
#[derive(Debug, Clone)]
pub struct ThresholdEngine {
    thresholds: AlertThresholds,
}

impl ThresholdEngine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Check the resource metrics against their limits
    ///
    /// Returns one alert per exceeded limit, in CPU, memory, disk order.
    /// A limit is exceeded only when the value is strictly above it.
    pub fn evaluate(&self, metrics: &HealthMetrics) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if metrics.cpu_percent > self.thresholds.cpu_percent {
            alerts.push(Alert::new(format!(
                "High CPU usage: {:.1}%",
                metrics.cpu_percent
            )));
        }

        if metrics.memory_percent > self.thresholds.memory_percent {
            alerts.push(Alert::new(format!(
                "High memory usage: {:.1}%",
                metrics.memory_percent
            )));
        }

        if metrics.disk_percent > self.thresholds.disk_percent {
            alerts.push(Alert::new(format!(
                "High disk usage: {:.1}%",
                metrics.disk_percent
            )));
        }

        alerts
    }

    /// True iff CPU, memory, and disk are each strictly below their limits
    ///
    /// A value sitting exactly on its limit is not healthy, even though it
    /// does not fire an alert.
    pub fn is_healthy(&self, metrics: &HealthMetrics) -> bool {
        metrics.cpu_percent < self.thresholds.cpu_percent
            && metrics.memory_percent < self.thresholds.memory_percent
            && metrics.disk_percent < self.thresholds.disk_percent
    }
}
