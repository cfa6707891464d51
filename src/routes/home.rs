use actix_web::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};

use super::client_ip;
use crate::domain::CorrelationId;

#[derive(serde::Serialize)]
pub struct SourceInfo {
    source_ip: Option<String>,
    timestamp: DateTime<Utc>,
}

#[tracing::instrument(
    name = "Processing root endpoint request",
    skip_all,
    fields(correlation_id = %correlation_id)
)]
pub async fn home(request: HttpRequest, correlation_id: CorrelationId) -> HttpResponse {
    let source_ip = client_ip(&request);
    tracing::info!(
        source_ip = source_ip.as_deref().unwrap_or_default(),
        "Root endpoint accessed"
    );

    HttpResponse::Ok().json(SourceInfo {
        source_ip,
        timestamp: Utc::now(),
    })
}
