//! Observability subsystem for the gateway
//!
//! - Structured logging (JSON lines on stderr)
//! - Dispatch and remote-call counters
//! - Lifecycle event tracing
//!
//! # Usage
//!
//! ```ignore
//! use honeycomb_gateway::observability::{Logger, Event, MetricsRegistry, ObservationScope};
//!
//! Logger::info("REMOTE_RESPONSE", &[("status", "200")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_dispatches_received();
//!
//! let scope = ObservationScope::with_fields("DISPATCH", &[("operation", "honeycomb_auth")]);
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{FailureKind, MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::BootStart);
        log_event(Event::BootComplete);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("api_url", "https://api.honeycomb.io")]);
    }
}
