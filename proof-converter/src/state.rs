//! Application State
//!
//! Shared state for the converter service, accessible from all route handlers.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::services::{ConverterConfig, FormatConverter};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Format converter (read-only)
    converter: FormatConverter,
    /// Every conversion attempt, successful or not
    total_conversions: AtomicU64,
    successful_conversions: AtomicU64,
    /// Rejected conversions
    failed_conversions: AtomicU64,
    /// Server start time
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new application state
    pub fn new(converter_config: ConverterConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                converter: FormatConverter::new(converter_config),
                total_conversions: AtomicU64::new(0),
                successful_conversions: AtomicU64::new(0),
                failed_conversions: AtomicU64::new(0),
                start_time: Instant::now(),
                started_at: Utc::now(),
            }),
        }
    }

    /// Get the format converter
    pub fn converter(&self) -> &FormatConverter {
        &self.inner.converter
    }

    pub fn total_conversions(&self) -> u64 {
        self.inner.total_conversions.load(Ordering::Relaxed)
    }

    pub fn successful_conversions(&self) -> u64 {
        self.inner.successful_conversions.load(Ordering::Relaxed)
    }

    pub fn failed_conversions(&self) -> u64 {
        self.inner.failed_conversions.load(Ordering::Relaxed)
    }

    /// Record the outcome of one conversion
    pub fn record_conversion(&self, succeeded: bool) {
        self.inner.total_conversions.fetch_add(1, Ordering::Relaxed);
        let counter = if succeeded {
            &self.inner.successful_conversions
        } else {
            &self.inner.failed_conversions
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Get server uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.inner.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_counts_both_outcomes() {
        let state = AppState::new(ConverterConfig::default());
        state.record_conversion(true);
        state.record_conversion(false);
        state.record_conversion(true);

        assert_eq!(state.total_conversions(), 3);
        assert_eq!(state.successful_conversions(), 2);
        assert_eq!(state.failed_conversions(), 1);
    }
}
