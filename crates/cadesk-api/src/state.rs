//! # Application State
//!
//! Shared state handed to every route through axum's `State` extractor.
//!
//! - **Reminder sweep**: wired to whichever [`DeadlineStore`] the binary
//!   selected at startup (direct Postgres or the hosted table API).
//! - **Backend client**: serves the session-scoped JSON routes. `None` when
//!   the backend URL or service key is missing; those routes answer 503.
//! - **Database pool**: present only when `DATABASE_URL` is set.

use std::sync::Arc;

use cadesk_backend::BackendClient;
use cadesk_reminders::{DeadlineStore, LogNotifier, PreferencePolicy, ReminderNotifier, ReminderSweep};
use sqlx::PgPool;

use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;

/// Runtime configuration read at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub reminder_policy: PreferencePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            reminder_policy: PreferencePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `REMINDER_POLICY`: `ignore` (default) or `honor`
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let reminder_policy = match std::env::var("REMINDER_POLICY") {
            Ok(raw) => raw.parse::<PreferencePolicy>().unwrap_or_else(|e| {
                tracing::warn!("{e}; falling back to 'ignore'");
                PreferencePolicy::Ignore
            }),
            Err(_) => PreferencePolicy::default(),
        };
        Self {
            port,
            reminder_policy,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sweep: ReminderSweep,
    pub backend: Option<BackendClient>,
    pub db_pool: Option<PgPool>,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// State with a sweep over `store` that logs its reminders, and no
    /// backend or database attached.
    pub fn new(config: AppConfig, store: Arc<dyn DeadlineStore>) -> Self {
        Self::with_notifier(config, store, Arc::new(LogNotifier))
    }

    pub fn with_notifier(
        config: AppConfig,
        store: Arc<dyn DeadlineStore>,
        notifier: Arc<dyn ReminderNotifier>,
    ) -> Self {
        let sweep = ReminderSweep::new(store, notifier).with_policy(config.reminder_policy);
        Self {
            config,
            sweep,
            backend: None,
            db_pool: None,
            metrics: ApiMetrics::new(),
        }
    }

    pub fn with_backend(mut self, backend: BackendClient) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// The backend client, or 503 if none is configured.
    pub fn require_backend(&self) -> Result<&BackendClient, AppError> {
        self.backend.as_ref().ok_or_else(|| {
            AppError::service_unavailable(
                "backend not configured. Set BACKEND_URL and BACKEND_SERVICE_KEY.",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadesk_reminders::InMemoryDeadlineStore;

    #[test]
    fn sweep_uses_configured_policy() {
        let config = AppConfig {
            reminder_policy: PreferencePolicy::Honor,
            ..AppConfig::default()
        };
        let state = AppState::new(config, Arc::new(InMemoryDeadlineStore::new()));
        assert_eq!(state.sweep.policy(), PreferencePolicy::Honor);
    }

    #[test]
    fn missing_backend_is_service_unavailable() {
        let state = AppState::new(AppConfig::default(), Arc::new(InMemoryDeadlineStore::new()));
        assert!(matches!(
            state.require_backend(),
            Err(AppError::ServiceUnavailable(_))
        ));
    }
}
