//! Tracing bridge.
//!
//! [`FacadeLayer`] lets code instrumented with `tracing` log through a
//! facade's sinks. Event fields other than `message` are appended to the
//! message as `key=value` pairs.

use std::fmt::Write as FmtWrite;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::facade::PapLogger;
use crate::level::Level;
use crate::logger::Logger;

/// Events from this crate are not forwarded, sinks report their own
/// failures through `tracing`.
const OWN_TARGET: &str = "paplogger_core";

/// A tracing Layer that forwards events to a [`Logger`].
pub struct FacadeLayer {
    logger: Logger,
}

impl FacadeLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Layer writing to the facade's logger.
    pub fn from_facade(facade: &PapLogger) -> Self {
        Self::new(facade.logger())
    }
}

impl<S> Layer<S> for FacadeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if target.starts_with(OWN_TARGET) {
            return;
        }

        let level = Level::from(*metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.logger.log_at(level, target, visitor.finish());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: impl std::fmt::Display) {
        let _ = write!(&mut self.fields, " {name}={value}");
    }

    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(&mut self.message, "{:?}", value);
        } else {
            let _ = write!(&mut self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field.name(), value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push_field(field.name(), value);
    }
}
