//! Background processing - scheduled counter reconciliation.

mod scheduler;

pub use scheduler::{SchedulerConfig, start_reconciliation};
