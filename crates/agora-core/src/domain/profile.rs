use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;

/// Researcher profile. Keyed by the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_interest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub institution: Option<String>,
    pub field_of_interest: Option<String>,
    pub bio: Option<String>,
    pub avatar_ref: Option<String>,
}

impl NewProfile {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::validation("userId is required"));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(DomainError::validation("firstName and lastName are required"));
        }
        Ok(())
    }

    pub fn into_profile(self) -> Profile {
        let now = Utc::now();
        Profile {
            profile_id: self.user_id.clone(),
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            institution: self.institution,
            field_of_interest: self.field_of_interest,
            bio: self.bio,
            avatar_ref: self.avatar_ref,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The mutable profile fields. Anything not listed here is rejected on input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub institution: Option<String>,
    pub field_of_interest: Option<String>,
    pub bio: Option<String>,
    pub avatar_ref: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            &self.first_name,
            &self.last_name,
            &self.phone,
            &self.institution,
            &self.field_of_interest,
            &self.bio,
            &self.avatar_ref,
        ];
        if fields.iter().all(|f| f.is_none()) {
            return Err(DomainError::validation("no fields to update"));
        }
        if matches!(&self.first_name, Some(n) if n.trim().is_empty())
            || matches!(&self.last_name, Some(n) if n.trim().is_empty())
        {
            return Err(DomainError::validation("names cannot be empty"));
        }
        Ok(())
    }

    pub fn into_fields(self, now: DateTime<Utc>) -> Map<String, Value> {
        let mut fields = Map::new();
        let pairs = [
            ("firstName", self.first_name),
            ("lastName", self.last_name),
            ("phone", self.phone),
            ("institution", self.institution),
            ("fieldOfInterest", self.field_of_interest),
            ("bio", self.bio),
            ("avatarRef", self.avatar_ref),
        ];
        for (name, value) in pairs {
            if let Some(value) = value {
                fields.insert(name.to_string(), Value::String(value));
            }
        }
        fields.insert("updatedAt".into(), Value::String(now.to_rfc3339()));
        fields
    }
}

/// Author display fields attached to feed items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInfo {
    pub author_name: String,
    pub author_profile_picture: Option<String>,
    /// False when the profile could not be resolved.
    pub author_known: bool,
}

impl AuthorInfo {
    pub const UNKNOWN_NAME: &'static str = "Unknown researcher";

    pub fn unknown() -> Self {
        Self {
            author_name: Self::UNKNOWN_NAME.to_string(),
            author_profile_picture: None,
            author_known: false,
        }
    }
}

impl From<&Profile> for AuthorInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            author_name: profile.display_name(),
            author_profile_picture: profile.avatar_ref.clone(),
            author_known: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"{"bio":"hi","email":"evil@example.com"}"#;
        assert!(serde_json::from_str::<ProfileUpdate>(raw).is_err());

        let raw = r#"{"bio":"hi","likeCount":9000}"#;
        assert!(serde_json::from_str::<ProfileUpdate>(raw).is_err());
    }

    #[test]
    fn update_writes_only_supplied_fields() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"institution":"ETH Zurich"}"#).unwrap();
        update.validate().unwrap();
        let fields = update.into_fields(Utc::now());
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["institution"], "ETH Zurich");
    }

    #[test]
    fn empty_update_is_invalid() {
        assert!(ProfileUpdate::default().validate().is_err());
    }
}
