//! # Sweep Subcommand
//!
//! Runs the same sweep the `/functions/v1/deadline-reminders` endpoint
//! runs, against the same store: Postgres when `DATABASE_URL` is set, the
//! hosted backend's table API otherwise.
//!
//! Exit codes: 0 when the sweep (or preview) completed, 1 when selection
//! failed. Per-row claim failures do not change the exit code; they appear
//! under `skipped` in the printed report.

use std::sync::Arc;

use anyhow::{Context, Result};
use cadesk_backend::{BackendClient, BackendConfig};
use cadesk_reminders::{DeadlineStore, LogNotifier, PreferencePolicy, ReminderSweep};
use chrono::{DateTime, Utc};
use clap::Args;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Print the planned actions without claiming any deadline.
    #[arg(long)]
    pub dry_run: bool,

    /// How owner notification preferences affect the sweep.
    #[arg(long, default_value = "ignore")]
    pub policy: PreferencePolicy,

    /// Evaluate the window at this instant (RFC 3339) instead of now.
    #[arg(long, value_parser = crate::parse_instant)]
    pub at: Option<DateTime<Utc>>,
}

/// Run or preview a sweep over `store` and render the result as JSON.
pub async fn execute(store: Arc<dyn DeadlineStore>, args: &SweepArgs) -> Result<String> {
    let sweep = ReminderSweep::new(store, Arc::new(LogNotifier)).with_policy(args.policy);
    let now = args.at.unwrap_or_else(Utc::now);

    let rendered = if args.dry_run {
        let preview = sweep
            .preview_at(now)
            .await
            .context("sweep preview failed")?;
        tracing::info!(planned = preview.planned.len(), "dry run complete");
        serde_json::to_string_pretty(&preview)?
    } else {
        let report = sweep.run_at(now).await.context("sweep failed")?;
        tracing::info!("{}", report.message());
        serde_json::to_string_pretty(&report)?
    };
    Ok(rendered)
}

/// Entry point for `cadesk sweep`.
pub fn run_sweep(args: &SweepArgs) -> Result<u8> {
    let config = BackendConfig::from_env();
    let client = BackendClient::new(config).context("failed to build backend client")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let rendered = runtime.block_on(async {
        let pool = cadesk_api::db::init_pool()
            .await
            .context("failed to connect to DATABASE_URL")?;
        let store = cadesk_api::db::sweep_store(pool.as_ref(), client);
        execute(store, args).await
    })?;
    println!("{rendered}");
    Ok(0)
}
