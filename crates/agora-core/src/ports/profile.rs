use async_trait::async_trait;

use crate::domain::AuthorInfo;
use crate::error::StoreError;

/// Resolves a user id to author display fields.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// `Ok(None)` when the user has no profile.
    async fn lookup(&self, user_id: &str) -> Result<Option<AuthorInfo>, StoreError>;
}
