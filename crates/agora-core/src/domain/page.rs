//! Pagination types.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use super::post::Post;
use super::profile::Profile;
use crate::error::DomainError;
use crate::ports::DocKey;

/// Opaque continuation token wrapping the store's native last-evaluated key.
///
/// Clients round-trip it verbatim and must not parse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn from_key(key: &DocKey) -> Self {
        let raw = format!("{}\n{}", key.partition, key.sort);
        Self(URL_SAFE_NO_PAD.encode(raw.as_bytes()))
    }

    pub fn to_key(&self) -> Result<DocKey, DomainError> {
        let invalid = || DomainError::validation("malformed cursor");
        let bytes = URL_SAFE_NO_PAD.decode(&self.0).map_err(|_| invalid())?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (partition, sort) = raw.split_once('\n').ok_or_else(invalid)?;
        Ok(DocKey::new(partition, sort))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// One page of posts plus the cursor for the next one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub next_cursor: Option<Cursor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePage {
    pub profiles: Vec<Profile>,
    pub next_cursor: Option<Cursor>,
}
