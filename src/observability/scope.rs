//! ObservationScope for begin/complete logging around a unit of work
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` with `duration_ms` on success
//! - Logs `{name}_REJECTED` (WARN) or `{name}_FAILED` (ERROR) on failure
//! - Logs `{name}_INCOMPLETE` if dropped without an outcome

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the lifecycle of one unit of work
pub struct ObservationScope {
    name: &'static str,
    completed: Cell<bool>,
    fields: Vec<(&'static str, String)>,
    started_at: Instant,
}

impl ObservationScope {
    /// Create a scope carrying `fields` on every event it logs
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let scope = Self {
            name,
            completed: Cell::new(false),
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started_at: Instant::now(),
        };
        Logger::info(&format!("{}_BEGIN", name), &scope.field_refs());
        scope
    }

    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, &[])
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }

    fn finish<'a>(
        &'a self,
        suffix: &str,
        extra: &[(&'a str, &'a str)],
    ) -> (String, Vec<(&'a str, &'a str)>) {
        self.completed.set(true);
        let mut fields = self.field_refs();
        fields.extend(extra.iter().copied());
        (format!("{}_{}", self.name, suffix), fields)
    }

    pub fn elapsed_ms(&self) -> String {
        self.started_at.elapsed().as_millis().to_string()
    }

    /// Successful completion; logs `{name}_COMPLETE` at INFO
    pub fn complete(self) {
        let elapsed = self.elapsed_ms();
        let (event, fields) = self.finish("COMPLETE", &[("duration_ms", &elapsed)]);
        Logger::info(&event, &fields);
    }

    /// Rejected before doing work (bad input); logs at WARN
    pub fn reject(self, reason: &str) {
        let (event, fields) = self.finish("REJECTED", &[("reason", reason)]);
        Logger::warn(&event, &fields);
    }

    /// Failed while doing work; logs at ERROR
    pub fn fail(self, reason: &str) {
        let elapsed = self.elapsed_ms();
        let (event, fields) =
            self.finish("FAILED", &[("duration_ms", &elapsed), ("reason", reason)]);
        Logger::error(&event, &fields);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.completed.get() {
            let event = format!("{}_INCOMPLETE", self.name);
            let mut fields = self.field_refs();
            fields.push(("reason", "scope dropped without completion"));
            Logger::warn(&event, &fields);
        }
    }
}
