use std::collections::BTreeMap;

use console::style;
use tracing::{field::Field, Level};
use tracing_subscriber::Layer;

use crate::WRITER;

fn level_prefix(level: Level) -> String {
    match level {
        Level::DEBUG => style("DEBUG").dim().to_string(),
        Level::INFO => style("INFO").blue().bold().to_string(),
        Level::WARN => style("WARNING").yellow().bold().to_string(),
        Level::ERROR => style("ERROR").red().bold().to_string(),
        Level::TRACE => style("TRACE").dim().to_string(),
    }
}

/// Renders `tracing` events as prefixed lines through [`WRITER`].
///
/// Only the `message` field is printed; structured fields are for the
/// `--debug` formatter.
pub struct SdeskLayer;

impl<S> Layer<S> for SdeskLayer
where
    S: tracing::Subscriber,
    S: for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let prefix = level_prefix(*event.metadata().level());

        let mut visitor = MessageRecorder(BTreeMap::new());
        event.record(&mut visitor);

        if let Some(msg) = visitor.0.get("message") {
            WRITER.writeln(&prefix, msg).ok();
        }
    }
}

struct MessageRecorder<'a>(BTreeMap<&'a str, String>);

impl tracing::field::Visit for MessageRecorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name(), value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.0.insert(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name(), format!("{value:?}"));
    }
}

/// Display a success message
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::WRITER
            .writeln(
                &$crate::console::style("SUCCESS").green().bold().to_string(),
                &format!($($arg)+),
            )
            .ok();
    };
}

/// Display one link of an error's cause chain
#[macro_export]
macro_rules! due_to {
    ($($arg:tt)+) => {
        $crate::WRITER
            .writeln(
                &$crate::console::style("DUE TO").yellow().bold().to_string(),
                &format!($($arg)+),
            )
            .ok();
    };
}
