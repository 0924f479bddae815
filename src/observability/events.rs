//! Lifecycle events for the gateway
//!
//! Events are explicit and typed. Per-dispatch events come from
//! `ObservationScope`; this enum covers everything around them.

use std::fmt;

use super::logger::Severity;

/// Observable gateway events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & lifecycle
    /// Process startup begins
    BootStart,
    /// Startup complete, ready to accept calls
    BootComplete,
    /// Shutdown complete
    ShutdownComplete,

    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Configuration rejected, process exits
    ConfigInvalid,

    // Surfaces
    /// HTTP listener bound
    ServerListening,
    /// Stdio session opened
    StdioSessionOpen,
    /// Stdio session ended (EOF)
    StdioSessionClosed,
    /// Stdio frame that could not be parsed
    StdioFrameRejected,

    // Query shape
    /// Granularity outside `[window/1000, window/10]`, forwarded anyway
    GranularityOutOfBounds,
}

impl Event {
    /// Returns the event name as logged
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "GATEWAY_STARTUP_BEGIN",
            Event::BootComplete => "GATEWAY_STARTUP_COMPLETE",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigInvalid => "CONFIG_INVALID",
            Event::ServerListening => "HTTP_SERVER_LISTENING",
            Event::StdioSessionOpen => "STDIO_SESSION_OPEN",
            Event::StdioSessionClosed => "STDIO_SESSION_CLOSED",
            Event::StdioFrameRejected => "STDIO_FRAME_REJECTED",
            Event::GranularityOutOfBounds => "QUERY_GRANULARITY_OUT_OF_BOUNDS",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigInvalid => Severity::Fatal,
            Event::StdioFrameRejected | Event::GranularityOutOfBounds => Severity::Warn,
            _ => Severity::Info,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        let events = [
            Event::BootStart,
            Event::BootComplete,
            Event::ShutdownComplete,
            Event::ConfigLoaded,
            Event::ConfigInvalid,
            Event::ServerListening,
            Event::StdioSessionOpen,
            Event::StdioSessionClosed,
            Event::StdioFrameRejected,
            Event::GranularityOutOfBounds,
        ];
        for event in events {
            assert!(event
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert!(Event::ConfigInvalid.is_fatal());
        assert!(!Event::BootStart.is_fatal());
        assert_eq!(Event::GranularityOutOfBounds.severity(), Severity::Warn);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::ServerListening), "HTTP_SERVER_LISTENING");
    }
}
