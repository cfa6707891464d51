pub mod configuration;
pub mod correlation;
pub mod domain;
pub mod metadata;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
