//! # Direct Postgres Store
//!
//! Optional. When `DATABASE_URL` is set the reminder sweep reads and claims
//! deadlines straight from Postgres instead of going through the hosted
//! table API. The JSON routes always use the backend client.

pub mod deadlines;

use std::sync::Arc;

use cadesk_backend::BackendClient;
use cadesk_reminders::{BackendDeadlineStore, DeadlineStore};
use sqlx::postgres::{PgPool, PgPoolOptions};

use self::deadlines::PgDeadlineStore;

/// Connect and run embedded migrations.
///
/// `Ok(None)` when `DATABASE_URL` is not set. An error means the URL was set
/// but connecting or migrating failed.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::info!("DATABASE_URL not set; reminder sweep uses the backend table API");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// The store a reminder sweep runs against: Postgres when a pool is
/// available, the backend table API otherwise.
pub fn sweep_store(pool: Option<&PgPool>, backend: BackendClient) -> Arc<dyn DeadlineStore> {
    match pool {
        Some(pool) => {
            tracing::info!("Reminder sweep reads deadlines from PostgreSQL");
            Arc::new(PgDeadlineStore::new(pool.clone()))
        }
        None => Arc::new(BackendDeadlineStore::new(backend)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadesk_backend::BackendConfig;
    use cadesk_core::ReminderWindow;
    use cadesk_reminders::StoreError;
    use chrono::Utc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn without_pool_the_sweep_reads_the_table_api() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/compliance_deadlines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;
        let backend =
            BackendClient::new(BackendConfig::local_mock(&mock_server.uri(), "service-key"))
                .unwrap();

        let selection = sweep_store(None, backend)
            .select_due(&ReminderWindow::starting_at(Utc::now()))
            .await
            .unwrap();
        assert!(selection.due.is_empty());
    }

    #[tokio::test]
    async fn with_pool_the_sweep_reads_postgres() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&mock_server)
            .await;
        let backend =
            BackendClient::new(BackendConfig::local_mock(&mock_server.uri(), "service-key"))
                .unwrap();
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://cadesk@127.0.0.1:1/cadesk")
            .unwrap();

        let err = sweep_store(Some(&pool), backend)
            .select_due(&ReminderWindow::starting_at(Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
