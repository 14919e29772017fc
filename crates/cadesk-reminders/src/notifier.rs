//! Reminder dispatch.
//!
//! No mail is sent from this crate. [`LogNotifier`] records the reminder it
//! would have sent as a structured log line; a real mailer plugs in behind
//! [`ReminderNotifier`].

use cadesk_core::{ComplianceDeadline, NotificationPreference};

use crate::error::NotifyError;

/// Delivers one reminder for a claimed deadline.
#[async_trait::async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn notify(
        &self,
        deadline: &ComplianceDeadline,
        preference: Option<&NotificationPreference>,
    ) -> Result<(), NotifyError>;
}

/// Writes each reminder to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl ReminderNotifier for LogNotifier {
    async fn notify(
        &self,
        deadline: &ComplianceDeadline,
        preference: Option<&NotificationPreference>,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            deadline_id = %deadline.id,
            owner_id = %deadline.owner_id,
            title = %deadline.title,
            due_date = %deadline.due_date,
            email_notifications = preference.map(|p| p.email_notifications),
            "Sending reminder for deadline: {}",
            deadline.title
        );
        Ok(())
    }
}
