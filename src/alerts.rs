use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A threshold violation detected during a monitoring cycle
///
/// Alerts are transient: they are dispatched and logged, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub message: String,
    pub triggered_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(message: String) -> Self {
        Self {
            message,
            triggered_at: Utc::now(),
        }
    }
}

/// Delivery seam for detected alerts
///
/// Production delivery (paging, chat) lives behind this trait and is out of
/// scope here; the in-crate implementations log or retain alerts.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn dispatch(&self, alerts: &[Alert]);
}

/// Dispatcher that writes every alert to the log at warning level
pub struct LogDispatcher;

#[async_trait]
impl AlertDispatcher for LogDispatcher {
    async fn dispatch(&self, alerts: &[Alert]) {
        for alert in alerts {
            log::warn!("[alert] {}", alert.message);
        }
    }
}

/// Dispatcher that retains the last N alerts in memory
///
/// Used by tests and the dry-run binary to observe what the scheduler
/// detected.
pub struct MemoryDispatcher {
    alerts: Arc<RwLock<VecDeque<Alert>>>,
    max_alerts: usize,
}

impl MemoryDispatcher {
    pub fn new(max_alerts: usize) -> Self {
        Self {
            alerts: Arc::new(RwLock::new(VecDeque::new())),
            max_alerts,
        }
    }

    /// Get the most recent alerts, newest first
    pub async fn recent(&self, count: usize) -> Vec<Alert> {
        let alerts = self.alerts.read().await;
        alerts.iter().rev().take(count).cloned().collect()
    }

    /// Get all retained alerts, oldest first
    pub async fn all(&self) -> Vec<Alert> {
        let alerts = self.alerts.read().await;
        alerts.iter().cloned().collect()
    }

    /// Clear all retained alerts
    pub async fn clear(&self) {
        *self.alerts.write().await = VecDeque::new();
    }
}

impl Default for MemoryDispatcher {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl AlertDispatcher for MemoryDispatcher {
    async fn dispatch(&self, alerts: &[Alert]) {
        let mut retained = self.alerts.write().await;
        for alert in alerts {
            retained.push_back(alert.clone());
        }

        // Keep only the last N alerts
        while retained.len() > self.max_alerts {
            retained.pop_front();
        }
    }
}
