//! Shapes log events into the JSON records understood by Cloud Logging.
//!
//! The backend classifies lines by `severity` and groups them by trace through
//! the `logging.googleapis.com/*` keys. Trace keys are left out entirely when an
//! event has no trace id, since an empty trace would still be read as one.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::severity::{Severity, gcp_severity};
use crate::domain::ProjectId;

pub const SEVERITY_KEY: &str = "severity";
pub const MESSAGE_KEY: &str = "message";
pub const TIMESTAMP_KEY: &str = "timestamp";
pub const TRACE_KEY: &str = "logging.googleapis.com/trace";
pub const TRACE_SAMPLED_KEY: &str = "logging.googleapis.com/trace_sampled";
pub const SPAN_ID_KEY: &str = "logging.googleapis.com/spanId";
pub const TEMPLATE_ID_KEY: &str = "templateId";

/// A structured log event as produced by application code.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub severity: Option<Severity>,
    pub message: String,
    pub error: Option<String>,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub template_id: Option<String>,
    pub timestamp: DateTime<FixedOffset>,
    pub properties: Map<String, Value>,
}

impl LogEvent {
    pub fn new(severity: Option<Severity>, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            error: None,
            trace_id: None,
            span_id: None,
            template_id: None,
            timestamp: Utc::now().fixed_offset(),
            properties: Map::new(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Renders `event` as a single JSON line (without the trailing newline).
pub fn format_record(event: &LogEvent, project_id: &ProjectId) -> String {
    let mut record = Map::new();

    record.insert(
        SEVERITY_KEY.into(),
        Value::from(gcp_severity(event.severity)),
    );

    let message = match non_empty(&event.error) {
        Some(error) => format!("{}\n{}", event.message, error),
        None => event.message.clone(),
    };
    record.insert(MESSAGE_KEY.into(), Value::from(message));

    record.insert(
        TIMESTAMP_KEY.into(),
        Value::from(
            event
                .timestamp
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        ),
    );

    if let Some(trace_id) = non_empty(&event.trace_id) {
        record.insert(
            TRACE_KEY.into(),
            Value::from(format!("projects/{project_id}/traces/{trace_id}")),
        );
        record.insert(TRACE_SAMPLED_KEY.into(), Value::Bool(true));
        if let Some(span_id) = non_empty(&event.span_id) {
            record.insert(SPAN_ID_KEY.into(), Value::from(span_id));
        }
    }

    if let Some(template_id) = &event.template_id {
        record.insert(TEMPLATE_ID_KEY.into(), Value::from(template_id.as_str()));
    }

    for (key, value) in &event.properties {
        record
            .entry(key.as_str())
            .or_insert_with(|| value.clone());
    }

    Value::Object(record).to_string()
}
