//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod profile;
mod reconcile;
mod store;

pub use profile::ProfileLookup;
pub use reconcile::{ReconcileReport, ReconcileSummary, Reconciler};
pub use store::{Collection, DocKey, Document, DocumentStore, ScanPage};
