//! The `tracing` layer that fans events out to the active sinks.
//!
//! The layer is installed once; the sinks behind it are swapped as a whole on
//! every re-initialization, which drops (and thereby flushes) the previous
//! ones. Callsite interest is never cached because the thresholds can change.

use crate::filters;
use crate::record::{FieldCollector, Record, SpanFields};
use crate::sink::{Sink, SinkKind};
use chrono::Local;
use log_config::Severity;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::span::{Attributes, Id, Record as SpanRecord};
use tracing::subscriber::Interest;
use tracing::{Event, Metadata, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Shared, replaceable set of sinks.
#[derive(Debug, Clone, Default)]
pub struct SinkSet {
    inner: Arc<RwLock<Vec<Sink>>>,
}

impl SinkSet {
    pub fn new(sinks: Vec<Sink>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(sinks)),
        }
    }

    /// Install `sinks`, returning the previous ones.
    ///
    /// Dropping the returned sinks flushes their pending records.
    #[must_use = "dropping the previous sinks flushes them"]
    pub fn replace(&self, sinks: Vec<Sink>) -> Vec<Sink> {
        std::mem::replace(&mut *self.inner.write(), sinks)
    }

    /// Remove and flush every sink.
    pub fn clear(&self) {
        drop(self.replace(Vec::new()));
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn kinds(&self) -> Vec<SinkKind> {
        self.inner.read().iter().map(|sink| sink.kind().clone()).collect()
    }

    /// Lowest threshold among the sinks, `None` when there are none.
    pub fn min_severity(&self) -> Option<Severity> {
        self.inner.read_recursive().iter().map(Sink::min_severity).min()
    }
}

pub struct Dispatcher {
    sinks: SinkSet,
    script_name: Option<Arc<str>>,
}

impl Dispatcher {
    pub fn new(sinks: SinkSet) -> Self {
        Self {
            sinks,
            script_name: None,
        }
    }

    /// Name bound onto every record forwarded from the `log` facade.
    pub fn with_script_name(mut self, script_name: Option<impl Into<Arc<str>>>) -> Self {
        self.script_name = script_name.map(Into::into);
        self
    }

    pub fn sinks(&self) -> &SinkSet {
        &self.sinks
    }
}

impl<S> Layer<S> for Dispatcher
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        if metadata.is_span() {
            return true;
        }
        self.sinks
            .min_severity()
            .is_some_and(|min| filters::may_pass(metadata, min))
    }

    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut collector = FieldCollector::default();
        attrs.record(&mut collector);
        span.extensions_mut()
            .insert(SpanFields(collector.render_fields()));
    }

    fn on_record(&self, id: &Id, values: &SpanRecord<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut collector = FieldCollector::default();
        values.record(&mut collector);
        let rendered = collector.render_fields();

        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(fields) => fields.append(&rendered),
            None => extensions.insert(SpanFields(rendered)),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let sinks = self.sinks.inner.read_recursive();
        if sinks.is_empty() {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        // Records from the `log` bridge carry their real call site in fields.
        let normalized = event.normalized_metadata();
        let bridged = normalized.is_some();
        let metadata = normalized.as_ref().unwrap_or_else(|| event.metadata());

        let severity = collector
            .severity
            .unwrap_or_else(|| Severity::from_level(metadata.level()));
        if !sinks.iter().any(|sink| sink.accepts(severity)) {
            return;
        }

        let spans = ctx
            .event_scope(event)
            .map(|scope| {
                scope
                    .from_root()
                    .map(|span| {
                        let extensions = span.extensions();
                        match extensions.get::<SpanFields>() {
                            Some(SpanFields(fields)) if !fields.is_empty() => {
                                format!("{}{{{fields}}}", span.name())
                            }
                            _ => span.name().to_string(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let backtrace = (severity >= Severity::Error
            && sinks
                .iter()
                .any(|sink| sink.accepts(severity) && sink.wants_backtrace()))
        .then(|| Arc::new(backtrace::Backtrace::new()));

        let record = Record {
            timestamp: Local::now(),
            severity,
            module: metadata.module_path().unwrap_or_else(|| metadata.target()),
            file: metadata.file(),
            line: metadata.line(),
            message: collector.message.unwrap_or_default(),
            fields: collector.fields,
            spans,
            script_name: if bridged { self.script_name.as_deref() } else { None },
            backtrace,
        };

        for sink in sinks.iter().filter(|sink| sink.accepts(severity)) {
            sink.write_record(&record);
        }
    }
}
