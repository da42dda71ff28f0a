//! Profile directory - researcher profiles and the author lookup used by the feed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::posts::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use super::{decode, encode, resolve_page_limit};
use crate::domain::{AuthorInfo, Cursor, NewProfile, Profile, ProfilePage, ProfileUpdate};
use crate::error::{DomainError, DomainResult, StoreError};
use crate::ports::{Collection, DocKey, DocumentStore, ProfileLookup};

#[derive(Clone)]
pub struct ProfileDirectory {
    store: Arc<dyn DocumentStore>,
}

impl ProfileDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create_profile(&self, input: NewProfile) -> DomainResult<Profile> {
        input.validate()?;
        let profile = input.into_profile();

        let inserted = self
            .store
            .put_if_absent(
                Collection::Profiles,
                &DocKey::item(&profile.user_id),
                encode(&profile)?,
            )
            .await?;
        if !inserted {
            return Err(DomainError::Conflict(format!(
                "profile for {} already exists",
                profile.user_id
            )));
        }

        tracing::info!(user_id = %profile.user_id, "Profile created");
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: &str) -> DomainResult<Profile> {
        let body = self
            .store
            .get(Collection::Profiles, &DocKey::item(user_id))
            .await?
            .ok_or_else(|| DomainError::not_found("Profile", user_id))?;
        Ok(decode(body)?)
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> DomainResult<Profile> {
        update.validate()?;
        let body = self
            .store
            .update_fields(
                Collection::Profiles,
                &DocKey::item(user_id),
                update.into_fields(Utc::now()),
            )
            .await?
            .ok_or_else(|| DomainError::not_found("Profile", user_id))?;

        tracing::info!(user_id, "Profile updated");
        Ok(decode(body)?)
    }

    /// `NotFound` if there was no profile to delete.
    pub async fn delete_profile(&self, user_id: &str) -> DomainResult<()> {
        let removed = self
            .store
            .delete(Collection::Profiles, &DocKey::item(user_id))
            .await?;
        if !removed {
            return Err(DomainError::not_found("Profile", user_id));
        }
        tracing::info!(user_id, "Profile deleted");
        Ok(())
    }

    /// Page through all profiles, in descending user id order.
    pub async fn list_profiles(
        &self,
        limit: Option<usize>,
        cursor: Option<&Cursor>,
    ) -> DomainResult<ProfilePage> {
        let limit = resolve_page_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
        let start_after = cursor.map(Cursor::to_key).transpose()?;

        let page = self
            .store
            .scan(Collection::Profiles, limit, start_after.as_ref())
            .await?;
        let profiles = page
            .items
            .into_iter()
            .map(|doc| decode(doc.body))
            .collect::<Result<Vec<Profile>, StoreError>>()?;

        tracing::debug!(returned = profiles.len(), "Profiles listed");
        Ok(ProfilePage {
            profiles,
            next_cursor: page.last_key.as_ref().map(Cursor::from_key),
        })
    }
}

#[async_trait]
impl ProfileLookup for ProfileDirectory {
    async fn lookup(&self, user_id: &str) -> Result<Option<AuthorInfo>, StoreError> {
        let Some(body) = self
            .store
            .get(Collection::Profiles, &DocKey::item(user_id))
            .await?
        else {
            return Ok(None);
        };
        let profile: Profile = decode(body)?;
        Ok(Some(AuthorInfo::from(&profile)))
    }
}
