//! DTOs for the user directory wire format.
//!
//! The adapter decodes into these transport DTOs first, then maps into
//! domain records in one pass. The directory nests the location under an
//! `address` object and spells profile flags in its own vocabulary, so
//! the flattening happens here and nowhere else.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AuthPayload, UserBatch};
use crate::domain::session::AccessToken;
use crate::domain::user::{UserDraft, UserId, UserPatch, UserProfile, UserRecord};

const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDto {
    pub(super) id: u64,
    #[serde(default)]
    pub(super) first_name: String,
    #[serde(default)]
    pub(super) last_name: String,
    #[serde(default)]
    pub(super) email: String,
    #[serde(default)]
    pub(super) age: u32,
    pub(super) gender: Option<String>,
    pub(super) birth_date: Option<String>,
    pub(super) university: Option<String>,
    pub(super) address: Option<AddressDto>,
    pub(super) image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddressDto {
    pub(super) city: Option<String>,
    pub(super) state: Option<String>,
}

impl AddressDto {
    fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

impl UserDto {
    pub(super) fn into_record(self) -> UserRecord {
        let location = self.address.as_ref().and_then(AddressDto::display);
        let profile = UserProfile {
            gender: self.gender,
            birth_date: self.birth_date.as_deref().and_then(parse_birth_date),
            university: self.university,
            location,
            newsletter: false,
            terms_accepted: false,
            avatar_url: self.image,
        };
        UserRecord::new(
            UserId::new(self.id),
            self.first_name,
            self.last_name,
            self.email,
            self.age,
        )
        .with_profile(profile)
    }
}

/// The directory emits both zero-padded and unpadded dates; an
/// unparseable date degrades to `None` rather than failing the record.
fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, BIRTH_DATE_FORMAT).ok()
}

#[derive(Debug, Deserialize)]
pub(super) struct UsersPageDto {
    #[serde(default)]
    pub(super) users: Vec<UserDto>,
    #[serde(default)]
    pub(super) total: Option<usize>,
}

impl UsersPageDto {
    pub(super) fn into_batch(self) -> UserBatch {
        let total = self.total.unwrap_or(self.users.len());
        UserBatch {
            users: self.users.into_iter().map(UserDto::into_record).collect(),
            total,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginDto {
    access_token: Option<String>,
    token: Option<String>,
    #[serde(flatten)]
    user: UserDto,
}

impl LoginDto {
    pub(super) fn into_payload(self) -> Result<AuthPayload, String> {
        // Older directory versions named the field `token`.
        let token = self
            .access_token
            .or(self.token)
            .ok_or_else(|| "login response carried no access token".to_owned())?;
        Ok(AuthPayload {
            token: AccessToken::new(token),
            profile: self.user.into_record(),
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewUserDto<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    university: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

impl<'a> From<&'a UserDraft> for NewUserDto<'a> {
    fn from(draft: &'a UserDraft) -> Self {
        let profile = &draft.profile;
        Self {
            first_name: &draft.first_name,
            last_name: &draft.last_name,
            email: &draft.email,
            age: draft.age,
            gender: profile.gender.as_deref(),
            birth_date: profile
                .birth_date
                .map(|date| date.format(BIRTH_DATE_FORMAT).to_string()),
            university: profile.university.as_deref(),
            image: profile.avatar_url.as_deref(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserPatchDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    university: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

impl<'a> From<&'a UserPatch> for UserPatchDto<'a> {
    fn from(patch: &'a UserPatch) -> Self {
        let profile = patch.profile.as_ref();
        Self {
            first_name: patch.first_name.as_deref(),
            last_name: patch.last_name.as_deref(),
            email: patch.email.as_deref(),
            age: patch.age,
            gender: profile.and_then(|profile| profile.gender.as_deref()),
            birth_date: profile.and_then(|profile| {
                profile
                    .birth_date
                    .map(|date| date.format(BIRTH_DATE_FORMAT).to_string())
            }),
            university: profile.and_then(|profile| profile.university.as_deref()),
            image: profile.and_then(|profile| profile.avatar_url.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use rstest::rstest;

    #[test]
    fn decodes_a_directory_page_payload() {
        let body = r#"{
            "users": [
                {
                    "id": 1,
                    "firstName": "Emily",
                    "lastName": "Johnson",
                    "email": "emily@example.com",
                    "age": 28,
                    "gender": "female",
                    "birthDate": "1996-5-30",
                    "university": "University of Wisconsin--Madison",
                    "address": { "city": "Phoenix", "state": "Mississippi" },
                    "image": "https://example.com/emily.png"
                }
            ],
            "total": 208,
            "skip": 0,
            "limit": 1
        }"#;

        let page: UsersPageDto = serde_json::from_str(body).expect("payload decodes");
        let batch = page.into_batch();
        assert_eq!(batch.total, 208);

        let record = batch.users.first().expect("one record");
        assert_eq!(record.full_name(), "Emily Johnson");
        assert_eq!(
            record.profile().location.as_deref(),
            Some("Phoenix, Mississippi")
        );
        assert_eq!(
            record.profile().avatar_url.as_deref(),
            Some("https://example.com/emily.png")
        );
    }

    #[test]
    fn missing_total_falls_back_to_the_batch_length() {
        let page: UsersPageDto =
            serde_json::from_str(r#"{ "users": [ { "id": 1 } ] }"#).expect("payload decodes");
        assert_eq!(page.into_batch().total, 1);
    }

    #[rstest]
    #[case("1996-05-30", Some((1996, 5, 30)))]
    #[case("1996-5-30", Some((1996, 5, 30)))]
    #[case("not-a-date", None)]
    fn birth_dates_parse_leniently(#[case] raw: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected =
            expected.and_then(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day));
        assert_eq!(parse_birth_date(raw), expected);
    }

    #[rstest]
    #[case::current(r#"{ "accessToken": "abc", "id": 1, "firstName": "Emily" }"#)]
    #[case::legacy(r#"{ "token": "abc", "id": 1, "firstName": "Emily" }"#)]
    fn login_payload_accepts_both_token_spellings(#[case] body: &str) {
        let login: LoginDto = serde_json::from_str(body).expect("payload decodes");
        let payload = login.into_payload().expect("token present");
        assert_eq!(payload.token.as_str(), "abc");
        assert_eq!(payload.profile.first_name(), "Emily");
    }

    #[test]
    fn login_payload_without_a_token_is_rejected() {
        let login: LoginDto =
            serde_json::from_str(r#"{ "id": 1, "firstName": "Emily" }"#).expect("payload decodes");
        let err = login.into_payload().expect_err("no token");
        assert!(err.contains("no access token"));
    }

    #[test]
    fn patch_serialisation_skips_unset_fields() {
        let patch = UserPatch {
            age: Some(29),
            ..UserPatch::default()
        };
        let encoded = serde_json::to_value(UserPatchDto::from(&patch)).expect("encodes");
        assert_eq!(encoded, serde_json::json!({ "age": 29 }));
    }

    #[test]
    fn draft_serialisation_uses_the_wire_spelling() {
        let draft = UserDraft {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            age: 36,
            profile: UserProfile {
                birth_date: NaiveDate::from_ymd_opt(1815, 12, 10),
                ..UserProfile::default()
            },
        };
        let encoded = serde_json::to_value(NewUserDto::from(&draft)).expect("encodes");
        assert_eq!(
            encoded,
            serde_json::json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "age": 36,
                "birthDate": "1815-12-10"
            })
        );
    }
}
