//! User record data model.
//!
//! Records are owned by the record store; views only ever receive clones.
//! The derived full name is maintained here so no caller can desynchronise
//! it from the name fields.

use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stable record identifier.
///
/// Identifiers are either assigned by the remote directory or minted from
/// the clock when a record is created in local-simulation mode. The store
/// trusts the generator and performs no duplicate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a known identifier, typically one assigned by the directory.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Mint a time-based identifier for a locally created record.
    pub fn minted_now() -> Self {
        Self(u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default())
    }

    /// Raw identifier value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Optional profile details carried alongside the core record fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Self-reported gender, free-form.
    pub gender: Option<String>,
    /// Date of birth when known.
    pub birth_date: Option<NaiveDate>,
    /// University name from the profile form.
    pub university: Option<String>,
    /// Free-form location string.
    pub location: Option<String>,
    /// Newsletter opt-in flag.
    pub newsletter: bool,
    /// Terms-of-service acceptance flag.
    pub terms_accepted: bool,
    /// Avatar image reference.
    pub avatar_url: Option<String>,
}

/// Payload for creating a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Age in years.
    pub age: u32,
    /// Optional profile details.
    pub profile: UserProfile,
}

/// Partial update merged into an existing record.
///
/// `None` fields are left untouched; a set `profile` replaces the whole
/// profile block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement contact email.
    pub email: Option<String>,
    /// Replacement age.
    pub age: Option<u32>,
    /// Replacement profile block.
    pub profile: Option<UserProfile>,
}

/// A single user entity managed by the CRUD workflow.
///
/// ## Invariants
/// - `full_name` always equals [`compose_full_name`] of the current name
///   fields; every mutation path goes through [`UserRecord::apply`] or a
///   constructor, so the derived value cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    id: UserId,
    first_name: String,
    last_name: String,
    full_name: String,
    email: String,
    age: u32,
    profile: UserProfile,
}

impl UserRecord {
    /// Build a record from its core fields, deriving the full name.
    pub fn new(
        id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        age: u32,
    ) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let full_name = compose_full_name(&first_name, &last_name);
        Self {
            id,
            first_name,
            last_name,
            full_name,
            email: email.into(),
            age,
            profile: UserProfile::default(),
        }
    }

    /// Build a record from a creation draft and an assigned identifier.
    pub fn from_draft(id: UserId, draft: UserDraft) -> Self {
        let UserDraft {
            first_name,
            last_name,
            email,
            age,
            profile,
        } = draft;
        Self::new(id, first_name, last_name, email, age).with_profile(profile)
    }

    /// Attach profile details, consuming the record builder-style.
    #[must_use]
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Merge a partial update, recomputing the full name when either name
    /// field changes.
    pub fn apply(&mut self, patch: &UserPatch) {
        let mut renamed = false;
        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
            renamed = true;
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
            renamed = true;
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(profile) = &patch.profile {
            self.profile = profile.clone();
        }
        if renamed {
            self.full_name = compose_full_name(&self.first_name, &self.last_name);
        }
    }

    /// Stable record identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Derived display name, `"{first} {last}"` with empty parts dropped.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Age in years.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Optional profile details.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }
}

/// Join the name parts with a single space, dropping blank parts.
pub fn compose_full_name(first_name: &str, last_name: &str) -> String {
    let mut parts = Vec::with_capacity(2);
    for part in [first_name.trim(), last_name.trim()] {
        if !part.is_empty() {
            parts.push(part);
        }
    }
    parts.join(" ")
}
