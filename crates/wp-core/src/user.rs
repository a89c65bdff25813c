//! # User Records
//!
//! Users are keyed by email. The profile is whatever object the client
//! submits at sign-in and is replaced wholesale on every upsert; the role
//! is managed by the server and survives profile upserts.

use crate::error::{AppError, AppResult};
use crate::id::DocumentId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form profile fields submitted by the client
pub type UserProfile = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Anything that is not `admin`
    #[serde(other)]
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(default)]
    pub profile: UserProfile,
}

impl User {
    pub fn new(email: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            id: DocumentId::generate(),
            email: email.into(),
            role: None,
            profile,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Normalize a profile submitted for `email`.
///
/// The key fields are owned by the record itself, so `email` and `role`
/// are dropped from the profile and a non-object body is rejected. Keys the
/// document store reserves (`$` prefix, `.` anywhere) are rejected at any depth.
pub fn profile_from_body(body: Value) -> AppResult<UserProfile> {
    match body {
        Value::Object(mut profile) => {
            check_profile_keys(&profile)?;
            profile.remove("email");
            profile.remove("role");
            profile.remove("_id");
            Ok(profile)
        }
        Value::Null => Ok(UserProfile::new()),
        other => Err(AppError::InvalidArgument(format!(
            "user profile must be a JSON object, got {other}"
        ))),
    }
}

fn check_profile_keys(fields: &Map<String, Value>) -> AppResult<()> {
    for (key, value) in fields {
        if key.starts_with('$') || key.contains('.') {
            return Err(AppError::InvalidArgument(format!(
                "profile key not allowed: {key}"
            )));
        }
        check_nested_keys(value)?;
    }
    Ok(())
}

fn check_nested_keys(value: &Value) -> AppResult<()> {
    match value {
        Value::Object(fields) => check_profile_keys(fields),
        Value::Array(items) => items.iter().try_for_each(check_nested_keys),
        _ => Ok(()),
    }
}

/// Basic shape check for natural keys that are emails
pub fn validate_email_key(email: &str) -> AppResult<()> {
    if validator::ValidateEmail::validate_email(&email) {
        Ok(())
    } else {
        Err(AppError::InvalidArgument(format!("invalid email: {email}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_strips_owned_fields() {
        let profile =
            profile_from_body(json!({"email": "a@b.io", "role": "admin", "name": "Ada"})).unwrap();
        assert_eq!(profile.len(), 1);
        assert_eq!(profile["name"], "Ada");
    }

    #[test]
    fn test_profile_rejects_non_object() {
        assert!(profile_from_body(json!([1, 2])).is_err());
        assert!(profile_from_body(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_profile_rejects_reserved_keys() {
        for body in [
            json!({"$where": 1}),
            json!({"address.city": "Oslo"}),
            json!({"address": {"$set": {"role": "admin"}}}),
            json!({"tags": [{"a.b": true}]}),
        ] {
            let err = profile_from_body(body.clone()).unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)), "{body}");
        }

        let nested = profile_from_body(json!({"address": {"city": "Oslo"}, "price": "$5"})).unwrap();
        assert_eq!(nested["address"]["city"], "Oslo");
    }

    #[test]
    fn test_unknown_role_is_member() {
        let user: User = serde_json::from_value(json!({
            "_id": "64b7f0c2a1b2c3d4e5f60718",
            "email": "a@b.io",
            "role": "moderator"
        }))
        .unwrap();
        assert_eq!(user.role, Some(Role::Member));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_email_keys() {
        assert!(validate_email_key("ada@example.com").is_ok());
        assert!(validate_email_key("not-an-email").is_err());
    }
}
