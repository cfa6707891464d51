use actix_web::{
    Error,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
};
use tracing::{Span, field::Empty};
use tracing_actix_web::RootSpanBuilder;

use super::TraceContext;
use crate::{
    correlation::{request_correlation_id, trace_identifier},
    routes::client_ip,
};

/// Opens one span per request carrying the request's logging context: the
/// correlation id, client details and the caller's trace context.
pub struct CloudRootSpanBuilder;

impl RootSpanBuilder for CloudRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        let http_request = request.request();
        let correlation_id = request_correlation_id(http_request);
        let user_agent = request
            .headers()
            .get("User-Agent")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");
        let client_ip = client_ip(http_request).unwrap_or_default();
        let route = request.match_pattern().unwrap_or_else(|| "default".into());

        let span = tracing::info_span!(
            "HTTP request",
            http.method = %request.method(),
            http.route = %route,
            http.target = %request.path(),
            http.client_ip = %client_ip,
            http.user_agent = %user_agent,
            http.status_code = Empty,
            request_id = %trace_identifier(http_request),
            correlation_id = %correlation_id,
            trace_id = Empty,
            span_id = Empty,
            exception.message = Empty,
        );

        if let Some(trace) = TraceContext::from_headers(request.headers()) {
            span.record("trace_id", trace.trace_id.as_str());
            if let Some(span_id) = &trace.span_id {
                span.record("span_id", span_id.as_str());
            }
        }

        span
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        match outcome {
            Ok(response) => {
                span.record("http.status_code", response.status().as_u16());
                if let Some(error) = response.response().error() {
                    span.record("exception.message", tracing::field::display(error));
                }
            }
            Err(error) => {
                let status = error.as_response_error().status_code();
                span.record("http.status_code", status.as_u16());
                span.record("exception.message", tracing::field::display(error));
            }
        }
    }
}
