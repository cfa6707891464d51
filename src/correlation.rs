use std::future::{Ready, ready};

use actix_web::{
    FromRequest, HttpMessage, HttpRequest,
    body::MessageBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
    middleware::Next,
};
use tracing_actix_web::RequestId;
use uuid::Uuid;

use crate::domain::CorrelationId;

pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Server-generated identifier of the request, unique per request.
pub fn trace_identifier(request: &HttpRequest) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Derives the correlation id from the inbound header, falling back to the
/// request's trace identifier.
pub fn derive_correlation_id(request: &HttpRequest) -> CorrelationId {
    // Non-ASCII values are kept rather than discarded.
    let supplied = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    CorrelationId::from_inbound(supplied.as_deref(), &trace_identifier(request))
}

/// Returns the correlation id scoped to this request, deriving and storing it
/// on first use.
pub fn request_correlation_id(request: &HttpRequest) -> CorrelationId {
    if let Some(id) = request.extensions().get::<CorrelationId>() {
        return id.clone();
    }

    let id = derive_correlation_id(request);
    request.extensions_mut().insert(id.clone());
    id
}

impl FromRequest for CorrelationId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(request_correlation_id(req)))
    }
}

/// Echoes the request's correlation id back to the caller.
pub async fn echo_correlation_id(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let correlation_id = request_correlation_id(req.request());
    let mut response = next.call(req).await?;

    if let Ok(value) = HeaderValue::from_str(correlation_id.as_ref()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-correlation-id"), value);
    }

    Ok(response)
}
