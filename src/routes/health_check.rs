use actix_web::HttpResponse;
use chrono::{DateTime, Utc};

use crate::domain::CorrelationId;

#[derive(serde::Serialize)]
pub struct HealthStatus {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

#[tracing::instrument(
    name = "Processing health check request",
    skip_all,
    fields(correlation_id = %correlation_id)
)]
pub async fn health_check(correlation_id: CorrelationId) -> HttpResponse {
    tracing::info!("Health check endpoint accessed");

    HttpResponse::Ok().json(HealthStatus {
        status: "healthy",
        timestamp: Utc::now(),
    })
}
