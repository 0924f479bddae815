//! Gateway metrics
//!
//! Counters only, monotonic, reset on process start. Relaxed atomics: the
//! registry is shared by concurrent dispatches without locking.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for dispatches and remote calls
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    dispatches_received: AtomicU64,
    dispatches_succeeded: AtomicU64,
    validation_errors: AtomicU64,
    unknown_operations: AtomicU64,
    missing_fields: AtomicU64,
    remote_errors: AtomicU64,
    transport_errors: AtomicU64,
    invalid_responses: AtomicU64,
    remote_calls: AtomicU64,
}

/// Which failure bucket a rejected dispatch lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    UnknownOperation,
    MissingField,
    Remote,
    Transport,
    InvalidResponse,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_dispatches_received(&self) {
        self.dispatches_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dispatches_succeeded(&self) {
        self.dispatches_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_remote_calls(&self) {
        self.remote_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed dispatch under its kind
    pub fn record_failure(&self, kind: FailureKind) {
        let counter = match kind {
            FailureKind::Validation => &self.validation_errors,
            FailureKind::UnknownOperation => &self.unknown_operations,
            FailureKind::MissingField => &self.missing_fields,
            FailureKind::Remote => &self.remote_errors,
            FailureKind::Transport => &self.transport_errors,
            FailureKind::InvalidResponse => &self.invalid_responses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatches_received: self.dispatches_received.load(Ordering::Relaxed),
            dispatches_succeeded: self.dispatches_succeeded.load(Ordering::Relaxed),
            validation_errors: self.validation_errors.load(Ordering::Relaxed),
            unknown_operations: self.unknown_operations.load(Ordering::Relaxed),
            missing_fields: self.missing_fields.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            invalid_responses: self.invalid_responses.load(Ordering::Relaxed),
            remote_calls: self.remote_calls.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub dispatches_received: u64,
    pub dispatches_succeeded: u64,
    pub validation_errors: u64,
    pub unknown_operations: u64,
    pub missing_fields: u64,
    pub remote_errors: u64,
    pub transport_errors: u64,
    pub invalid_responses: u64,
    pub remote_calls: u64,
}

impl MetricsSnapshot {
    /// Dispatches that ended in an error payload
    pub fn dispatches_failed(&self) -> u64 {
        self.validation_errors
            + self.unknown_operations
            + self.missing_fields
            + self.remote_errors
            + self.transport_errors
            + self.invalid_responses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.dispatches_received, 0);
        assert_eq!(snapshot.remote_calls, 0);
        assert_eq!(snapshot.dispatches_failed(), 0);
    }

    #[test]
    fn test_failures_bucketed_by_kind() {
        let registry = MetricsRegistry::new();
        registry.record_failure(FailureKind::MissingField);
        registry.record_failure(FailureKind::MissingField);
        registry.record_failure(FailureKind::Remote);
        registry.record_failure(FailureKind::UnknownOperation);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.missing_fields, 2);
        assert_eq!(snapshot.remote_errors, 1);
        assert_eq!(snapshot.unknown_operations, 1);
        assert_eq!(snapshot.dispatches_failed(), 4);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_dispatches_received();
        registry.increment_dispatches_succeeded();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["dispatches_received"], 1);
        assert_eq!(json["dispatches_succeeded"], 1);
        assert_eq!(json["transport_errors"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_dispatches_received();
                    reg.increment_remote_calls();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.dispatches_received, 1000);
        assert_eq!(snapshot.remote_calls, 1000);
    }
}
