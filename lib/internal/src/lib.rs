pub mod graphql;
pub mod logging;
pub mod pipeline;
pub mod telemetry;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
