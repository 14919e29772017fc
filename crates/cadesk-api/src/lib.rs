//! # cadesk-api: HTTP service
//!
//! ## API Surface
//!
//! | Prefix                              | Module                   | Session |
//! |-------------------------------------|--------------------------|---------|
//! | `/functions/v1/deadline-reminders`  | [`routes::reminders`]    | no      |
//! | `/v1/session`                       | [`routes::session`]      | yes     |
//! | `/v1/deadlines/*`                   | [`routes::deadlines`]    | yes     |
//! | `/v1/tasks/*`                       | [`routes::tasks`]        | yes     |
//! | `/v1/documents/*`                   | [`routes::documents`]    | yes     |
//! | `/v1/clients/*`                     | [`routes::clients`]      | yes     |
//! | `/v1/preferences`                   | [`routes::preferences`]  | yes     |
//! | `/health/*`, `/metrics`             | [`routes::ops`]          | no      |
//! | `/openapi.json`                     | [`openapi`]              | no      |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → Metrics → Session (/v1 only) → Handler
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;

use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let v1 = Router::new()
        .merge(routes::session::router())
        .merge(routes::deadlines::router())
        .merge(routes::tasks::router())
        .merge(routes::documents::router())
        .merge(routes::clients::router())
        .merge(routes::preferences::router())
        .layer(from_fn_with_state(state.clone(), auth::session_middleware));

    let api = Router::new()
        .merge(v1)
        .merge(routes::reminders::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics));

    Router::new()
        .merge(routes::ops::router())
        .merge(api)
        .with_state(state)
}
