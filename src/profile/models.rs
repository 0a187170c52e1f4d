//! Domain models for user profiles and their stored credentials.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Opaque structured payload carried alongside a profile, serialized as text
/// at the storage boundary.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Absent until the profile has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Plaintext password, transient: accepted on requests, never serialized
    /// back out, never persisted directly.
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<AdditionalData>,
}

impl UserProfile {
    pub fn trim_whitespace(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
    }
}

/// The persisted salt/hash pair owned by one user profile.
///
/// Created exactly once at registration and never updated in place; the
/// database removes it together with the owning profile row.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: Option<i32>,
    pub user_id: Option<i32>,
    /// Base64 of the raw salt.
    pub password_salt: String,
    /// Base64 of the full envelope, not just a hash.
    pub password_hash: String,
}

impl Credential {
    #[must_use]
    pub fn new(password_salt: String, password_hash: String) -> Self {
        Self {
            id: None,
            user_id: None,
            password_salt,
            password_hash,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("unsupported patch op: {0}")]
    UnsupportedOp(String),
    #[error("unknown patch path: {0}")]
    UnknownPath(String),
    #[error("invalid value for {0}")]
    InvalidValue(String),
}

/// One JSON-patch style operation applied to a stored profile.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct PatchOp {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub value: Option<serde_json::Value>,
}

impl PatchOp {
    /// Apply this operation to `profile`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported op, an unknown path, or a value
    /// that does not fit the targeted field.
    pub fn apply(&self, profile: &mut UserProfile) -> Result<(), PatchError> {
        match self.op.as_str() {
            "replace" | "add" => self.apply_set(profile),
            "remove" => self.apply_remove(profile),
            other => Err(PatchError::UnsupportedOp(other.to_string())),
        }
    }

    fn apply_set(&self, profile: &mut UserProfile) -> Result<(), PatchError> {
        let value = self
            .value
            .as_ref()
            .ok_or_else(|| PatchError::InvalidValue(self.path.clone()))?;

        match self.path.as_str() {
            "/username" => profile.username = self.string_value(value)?,
            "/email" => profile.email = self.string_value(value)?,
            "/additionalData" => {
                let data = serde_json::from_value(value.clone())
                    .map_err(|_| PatchError::InvalidValue(self.path.clone()))?;
                profile.additional_data = Some(data);
            }
            "/additionalData/firstName" => {
                profile
                    .additional_data
                    .get_or_insert_with(AdditionalData::default)
                    .first_name = Some(self.string_value(value)?);
            }
            "/additionalData/lastName" => {
                profile
                    .additional_data
                    .get_or_insert_with(AdditionalData::default)
                    .last_name = Some(self.string_value(value)?);
            }
            other => return Err(PatchError::UnknownPath(other.to_string())),
        }

        Ok(())
    }

    fn apply_remove(&self, profile: &mut UserProfile) -> Result<(), PatchError> {
        match self.path.as_str() {
            "/additionalData" => profile.additional_data = None,
            "/additionalData/firstName" => {
                if let Some(data) = profile.additional_data.as_mut() {
                    data.first_name = None;
                }
            }
            "/additionalData/lastName" => {
                if let Some(data) = profile.additional_data.as_mut() {
                    data.last_name = None;
                }
            }
            other => return Err(PatchError::UnknownPath(other.to_string())),
        }

        Ok(())
    }

    fn string_value(&self, value: &serde_json::Value) -> Result<String, PatchError> {
        value
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| PatchError::InvalidValue(self.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn replace(path: &str, value: serde_json::Value) -> PatchOp {
        PatchOp {
            op: "replace".to_string(),
            path: path.to_string(),
            value: Some(value),
        }
    }

    #[test]
    fn test_trim_whitespace() {
        let mut profile = UserProfile {
            username: "  ada  ".to_string(),
            email: " ada@lovelace.org ".to_string(),
            ..UserProfile::default()
        };

        profile.trim_whitespace();

        assert_eq!(profile.username, "ada");
        assert_eq!(profile.email, "ada@lovelace.org");
    }

    #[test]
    fn test_password_is_never_serialized() {
        let profile = UserProfile {
            username: "ada".to_string(),
            email: "ada@lovelace.org".to_string(),
            password: "p4ssw0rd".to_string(),
            ..UserProfile::default()
        };

        let serialized = serde_json::to_string(&profile).unwrap();

        assert!(!serialized.contains("p4ssw0rd"));
        assert!(!serialized.contains("password"));
    }

    #[test]
    fn test_patch_replaces_top_level_fields() {
        let mut profile = UserProfile::default();

        replace("/username", json!("ada")).apply(&mut profile).unwrap();
        replace("/email", json!("ada@lovelace.org"))
            .apply(&mut profile)
            .unwrap();

        assert_eq!(profile.username, "ada");
        assert_eq!(profile.email, "ada@lovelace.org");
    }

    #[test]
    fn test_patch_replaces_additional_data_leaves() {
        let mut profile = UserProfile::default();

        replace("/additionalData/firstName", json!("Ada"))
            .apply(&mut profile)
            .unwrap();
        replace("/additionalData/lastName", json!("Lovelace"))
            .apply(&mut profile)
            .unwrap();

        assert_eq!(
            profile.additional_data,
            Some(AdditionalData {
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
            })
        );
    }

    #[test]
    fn test_patch_replaces_whole_additional_data() {
        let mut profile = UserProfile::default();

        replace(
            "/additionalData",
            json!({"firstName": "Ada", "lastName": "Lovelace"}),
        )
        .apply(&mut profile)
        .unwrap();

        assert_eq!(
            profile.additional_data.as_ref().unwrap().first_name,
            Some("Ada".to_string())
        );
    }

    #[test]
    fn test_patch_remove() {
        let mut profile = UserProfile {
            additional_data: Some(AdditionalData {
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
            }),
            ..UserProfile::default()
        };

        PatchOp {
            op: "remove".to_string(),
            path: "/additionalData/firstName".to_string(),
            value: None,
        }
        .apply(&mut profile)
        .unwrap();

        assert_eq!(profile.additional_data.as_ref().unwrap().first_name, None);

        PatchOp {
            op: "remove".to_string(),
            path: "/additionalData".to_string(),
            value: None,
        }
        .apply(&mut profile)
        .unwrap();

        assert_eq!(profile.additional_data, None);
    }

    #[test]
    fn test_patch_rejects_unknown_op_and_path() {
        let mut profile = UserProfile::default();

        let result = PatchOp {
            op: "move".to_string(),
            path: "/username".to_string(),
            value: Some(json!("ada")),
        }
        .apply(&mut profile);
        assert_eq!(result, Err(PatchError::UnsupportedOp("move".to_string())));

        let result = replace("/id", json!(7)).apply(&mut profile);
        assert_eq!(result, Err(PatchError::UnknownPath("/id".to_string())));

        let result = replace("/username", json!(42)).apply(&mut profile);
        assert_eq!(
            result,
            Err(PatchError::InvalidValue("/username".to_string()))
        );
    }
}
