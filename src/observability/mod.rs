//! Observability for the engine
//!
//! - Structured logging (JSON)
//! - Typed engine events
//! - Run-scoped begin/complete tracing
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on evaluation
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use rowkit::observability::{log_event, Event, ObservationScope};
//!
//! log_event(Event::FilterDropped, &[("fn", "isSomething")]);
//!
//! let scope = ObservationScope::new("ACTION_RUN");
//! // ... evaluate ...
//! scope.complete_with_fields(&[("iterations", "4")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log an engine event at its catalogued severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
