pub mod api;
pub mod infrastructure;
pub mod schema;
pub mod telemetry;
