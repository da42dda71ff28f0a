//! Stores and services built on the ports.

mod engagement;
mod feed;
mod follows;
mod posts;
mod profiles;
mod reconcile;

pub use engagement::EngagementStore;
pub use feed::FeedAssembler;
pub use follows::FollowGraph;
pub use posts::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PAGE_SIZE_CEILING, PostStore};
pub use profiles::ProfileDirectory;
pub use reconcile::CounterReconciler;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DomainError, DomainResult, StoreError};

fn encode<T: Serialize>(entity: &T) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(entity)?)
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(body)?)
}

/// `None` takes the default, zero is rejected, anything larger is clamped.
fn resolve_page_limit(limit: Option<usize>, default: usize, max: usize) -> DomainResult<usize> {
    match limit {
        None => Ok(default),
        Some(0) => Err(DomainError::validation("limit must be at least 1")),
        Some(n) => Ok(n.min(max)),
    }
}
