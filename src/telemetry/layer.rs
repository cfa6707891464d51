use std::io::Write;

use serde_json::{Map, Value};
use tracing::{Event, Id, Subscriber};
use tracing_bunyan_formatter::JsonStorage;
use tracing_subscriber::{
    Layer,
    fmt::MakeWriter,
    layer::Context,
    registry::{LookupSpan, SpanRef},
};

use super::{LogEvent, Severity, format_record};
use crate::domain::ProjectId;

pub const ERROR_FIELD: &str = "error.cause_chain";
pub const TRACE_ID_FIELD: &str = "trace_id";
pub const SPAN_ID_FIELD: &str = "span_id";
pub const TEMPLATE_ID_FIELD: &str = "template_id";
pub const FATAL_FIELD: &str = "fatal";
pub const STATUS_CODE_FIELD: &str = "http.status_code";
pub const EXCEPTION_FIELD: &str = "exception.message";

/// Writes every event, and every closed span, as one Cloud Logging record.
///
/// Span fields are read from the [`JsonStorage`] that
/// [`tracing_bunyan_formatter::JsonStorageLayer`] keeps on each span, so that
/// layer must sit below this one.
pub struct GcpFormattingLayer<W: for<'a> MakeWriter<'a> + 'static> {
    make_writer: W,
    project_id: ProjectId,
    default_fields: Map<String, Value>,
}

impl<W: for<'a> MakeWriter<'a> + 'static> GcpFormattingLayer<W> {
    pub fn new(name: String, project_id: ProjectId, make_writer: W) -> Self {
        let mut default_fields = Map::new();
        default_fields.insert("service".into(), Value::from(name));

        Self {
            make_writer,
            project_id,
            default_fields,
        }
    }

    fn span_fields<S>(&self, span: Option<SpanRef<'_, S>>, fields: &mut Map<String, Value>)
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let Some(span) = span else {
            return;
        };
        let extensions = span.extensions();
        // Parent fields are already merged into the child's storage.
        if let Some(storage) = extensions.get::<JsonStorage>() {
            for (key, value) in storage.values() {
                fields.insert((*key).to_owned(), value.clone());
            }
        }
    }

    fn emit(&self, severity: Severity, default_message: String, mut fields: Map<String, Value>) {
        let fatal = matches!(fields.remove(FATAL_FIELD), Some(Value::Bool(true)));
        let severity = match severity {
            Severity::Error if fatal => Severity::Fatal,
            other => other,
        };

        let message = fields
            .remove("message")
            .map(value_to_string)
            .unwrap_or(default_message);

        let mut event = LogEvent::new(Some(severity), message);
        event.error = fields.remove(ERROR_FIELD).map(value_to_string);
        event.trace_id = fields.remove(TRACE_ID_FIELD).map(value_to_string);
        event.span_id = fields.remove(SPAN_ID_FIELD).map(value_to_string);
        event.template_id = fields.remove(TEMPLATE_ID_FIELD).map(value_to_string);
        fields.retain(|key, _| !key.starts_with("log."));
        event.properties = fields;

        let mut line = format_record(&event, &self.project_id);
        line.push('\n');
        let _ = self.make_writer.make_writer().write_all(line.as_bytes());
    }
}

/// A server error status or a recorded exception marks the span as failed.
fn is_failure(fields: &Map<String, Value>) -> bool {
    let server_error = fields
        .get(STATUS_CODE_FIELD)
        .and_then(Value::as_u64)
        .is_some_and(|status| status >= 500);
    server_error || fields.contains_key(EXCEPTION_FIELD)
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl<S, W> Layer<S> for GcpFormattingLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'a> MakeWriter<'a> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = self.default_fields.clone();
        self.span_fields(ctx.event_span(event), &mut fields);

        let mut event_visitor = JsonStorage::default();
        event.record(&mut event_visitor);
        for (key, value) in event_visitor.values() {
            fields.insert((*key).to_owned(), value.clone());
        }

        let severity = Severity::from_level(event.metadata().level(), false);
        self.emit(severity, String::new(), fields);
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let severity = Severity::from_level(span.metadata().level(), false);
        let message = format!("{} completed", span.name());

        let mut fields = self.default_fields.clone();
        self.span_fields(Some(span), &mut fields);
        // The span's own fields never carry the message.
        fields.remove("message");
        let severity = if severity < Severity::Error && is_failure(&fields) {
            Severity::Error
        } else {
            severity
        };
        self.emit(severity, message, fields);
    }
}
