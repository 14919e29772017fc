//! OpenAPI document for the whole surface, served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "cadesk API",
        version = "0.1.0",
        description = "Compliance deadlines, tasks, documents and client engagements for businesses and their CA/CS professionals, plus the deadline reminder function.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::reminders::invoke,
        crate::routes::session::current_session,
        crate::routes::deadlines::list_deadlines,
        crate::routes::deadlines::create_deadline,
        crate::routes::deadlines::get_deadline,
        crate::routes::deadlines::update_deadline,
        crate::routes::tasks::list_tasks,
        crate::routes::tasks::create_task,
        crate::routes::tasks::update_task_status,
        crate::routes::documents::list_documents,
        crate::routes::documents::upload_document,
        crate::routes::documents::delete_document,
        crate::routes::clients::list_clients,
        crate::routes::clients::create_client,
        crate::routes::clients::get_client,
        crate::routes::preferences::get_preferences,
        crate::routes::preferences::put_preferences,
        crate::routes::ops::metrics,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::reminders::InvocationSuccess,
        crate::routes::reminders::InvocationFailure,
        crate::routes::session::SessionView,
        crate::routes::tasks::TaskStatusUpdate,
        crate::routes::preferences::PreferenceUpdate,
        crate::middleware::metrics::MetricsSnapshot,
        cadesk_core::DeadlineId,
        cadesk_core::UserId,
        cadesk_core::ClientId,
        cadesk_core::TaskId,
        cadesk_core::DocumentId,
        cadesk_core::ComplianceDeadline,
        cadesk_core::NewDeadline,
        cadesk_core::DeadlinePatch,
        cadesk_core::DeadlineStatus,
        cadesk_core::Priority,
        cadesk_core::ComplianceTask,
        cadesk_core::NewTask,
        cadesk_core::TaskStatus,
        cadesk_core::Document,
        cadesk_core::ClientRecord,
        cadesk_core::NewClient,
        cadesk_core::ClientStatus,
        cadesk_core::NotificationPreference,
        cadesk_core::AuthUser,
        cadesk_core::AccountKind,
        cadesk_core::AccountProfile,
        cadesk_core::ProfessionalProfile,
        cadesk_core::BusinessProfile,
    )),
    tags(
        (name = "reminders", description = "Scheduled deadline reminder sweep"),
        (name = "session", description = "Current caller"),
        (name = "deadlines", description = "Compliance deadlines"),
        (name = "tasks", description = "Compliance tasks per client engagement"),
        (name = "documents", description = "Uploaded documents"),
        (name = "clients", description = "Client engagements"),
        (name = "preferences", description = "Notification preferences"),
        (name = "ops", description = "Health and counters"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
