mod formatter;
mod layer;
mod root_span;
mod severity;
mod trace_context;

pub use formatter::{LogEvent, format_record};
pub use layer::GcpFormattingLayer;
pub use root_span::CloudRootSpanBuilder;
pub use severity::{Severity, gcp_severity};
pub use trace_context::TraceContext;

use tracing::Subscriber;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::JsonStorageLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt};

use crate::domain::ProjectId;

/// Composes the subscriber writing Cloud Logging records to `sink`.
///
/// `RUST_LOG` takes precedence over `env_filter` when set.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    project_id: ProjectId,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = GcpFormattingLayer::new(name, project_id, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs `subscriber` process-wide. Call once.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}
