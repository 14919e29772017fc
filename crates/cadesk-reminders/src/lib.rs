//! # cadesk-reminders: Deadline reminder sweep
//!
//! Finds compliance deadlines due within the next seven days whose owners
//! have not been reminded yet, claims each one, and dispatches a reminder.
//!
//! ## State machine per deadline
//!
//! ```text
//! not-due ──▶ due-soon-unnotified ──(claim)──▶ notified
//! ```
//!
//! The sweep only ever performs the last transition. `notification_sent` is
//! never reset by this crate.
//!
//! ## Seams
//!
//! - [`DeadlineStore`]: selection and conditional claim. In-memory and
//!   hosted-backend implementations are provided here.
//! - [`ReminderNotifier`]: reminder delivery. [`LogNotifier`] logs instead of
//!   sending mail.
//! - [`PreferencePolicy`]: whether owner preferences narrow the window or
//!   suppress dispatch.

pub mod error;
pub mod notifier;
pub mod policy;
pub mod store;
pub mod sweep;

pub use error::{NotifyError, StoreError, SweepError};
pub use notifier::{LogNotifier, ReminderNotifier};
pub use policy::{PlannedAction, PreferencePolicy};
pub use store::{
    BackendDeadlineStore, ClaimOutcome, DeadlineStore, DueDeadline, InMemoryDeadlineStore,
    Selection, UnreadableRow,
};
pub use sweep::{
    PlannedReminder, ReminderSweep, SkipReason, SkippedRow, SweepPreview, SweepReport,
};
