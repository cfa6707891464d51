mod correlation_id;
mod project_id;

pub use correlation_id::CorrelationId;
pub use project_id::ProjectId;
