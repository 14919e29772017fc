//! # cadesk-core: Domain Types for cadesk
//!
//! The leaf crate of the workspace. Defines the records exchanged between
//! the hosted backend, the reminder sweep, and the HTTP surface, plus the
//! validation rules every record must satisfy at the boundary.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `DeadlineId`, `UserId`, `ClientId`, `TaskId`,
//!    `DocumentId` are distinct types. A task id cannot be passed where a
//!    deadline id is expected.
//!
//! 2. **Fail fast on malformed rows.** Every record implements [`Validate`].
//!    Decoders run it before a row reaches any caller, so partial or
//!    inconsistent rows never propagate.
//!
//! 3. **One account lookup.** [`AccountProfile`] is a tagged union on
//!    `account_type`; resolving a user's role is a single decode, not a
//!    sequence of speculative table probes.
//!
//! 4. **Explicit session context.** [`Session`] is a value handed to the
//!    code that needs it. There is no process-wide "current user".
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cadesk-*` crates.
//! - No I/O.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod client;
pub mod deadline;
pub mod document;
pub mod error;
pub mod ids;
pub mod preference;
pub mod profile;
pub mod session;
pub mod task;
pub mod validate;
pub mod window;

pub use client::{ClientRecord, ClientStatus, NewClient};
pub use deadline::{
    ComplianceDeadline, DeadlinePatch, DeadlineStatus, NewDeadline, Priority, ReminderState,
};
pub use document::{Document, NewDocument};
pub use error::ValidationError;
pub use ids::{ClientId, DeadlineId, DocumentId, TaskId, UserId};
pub use preference::NotificationPreference;
pub use profile::{AccountKind, AccountProfile, BusinessProfile, ProfessionalProfile};
pub use session::{AccessToken, AuthUser, Session};
pub use task::{ComplianceTask, NewTask, TaskStatus};
pub use validate::Validate;
pub use window::{ReminderWindow, NOTIFICATION_HORIZON_DAYS};
