//! Audit trail core
//!
//! Every mutation of a tracked entity is captured as a pair of flat
//! [`Snapshot`]s (before/after), reduced to a field-level [`Changeset`], and
//! appended to the audit log. The snapshot projection and the diff are pure;
//! the only I/O lives behind the [`EntityStore`] and [`AuditSink`] seams.

mod diff;
mod recorder;
mod snapshot;
mod store;

pub use diff::{diff, Changeset, FieldChange, MISSING_VALUE};
pub use recorder::{AuditActor, AuditRecorder};
pub use snapshot::{project_inventory, Snapshot, SnapshotBuilder};
pub use store::{AuditSink, EntityStore, StoreUnavailable};
