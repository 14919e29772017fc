//! Tower/axum middleware shared by every route.

pub mod metrics;
pub mod tracing_layer;
