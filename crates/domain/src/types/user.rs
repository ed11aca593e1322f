//! User profile types
//!
//! The profile returned by `/auth/me` and embedded in every auth response.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Role assigned to a user by the backend.
///
/// Unknown role names are preserved verbatim in [`Role::Other`] so newer
/// backends do not break older clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
    ContentEditor,
    Analyst,
    Other(String),
}

impl Role {
    /// Wire name of the role (`USER`, `ADMIN`, ...).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::ContentEditor => "CONTENT_EDITOR",
            Self::Analyst => "ANALYST",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "USER" => Self::User,
            "ADMIN" => Self::Admin,
            "CONTENT_EDITOR" => Self::ContentEditor,
            "ANALYST" => Self::Analyst,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user's profile.
///
/// Replaced wholesale on every successful auth operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    /// Capability tags; only present on permission-bearing profiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// Minimal profile, mostly useful for tests and fixtures.
    #[must_use]
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: String::new(),
            full_name: String::new(),
            role,
            permissions: None,
            avatar: None,
            active: None,
            social_provider: None,
            last_login: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Attach capability tags.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    /// Name suitable for greetings: full name when known, else username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }

    /// Whether the profile carries the given capability tag.
    #[must_use]
    pub fn holds(&self, permission: &str) -> bool {
        self.permissions.as_ref().is_some_and(|set| set.contains(permission))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_backend_profile() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 42,
            "username": "alice",
            "email": "alice@example.com",
            "fullName": "Alice Nguyen",
            "role": "CONTENT_EDITOR",
            "permissions": ["content:edit", "content:publish"],
            "socialProvider": "GOOGLE"
        }))
        .unwrap();

        assert_eq!(profile.id, "42");
        assert_eq!(profile.role, Role::ContentEditor);
        assert!(profile.holds("content:edit"));
        assert!(!profile.holds("user:manage"));
        assert_eq!(profile.display_name(), "Alice Nguyen");
        assert_eq!(profile.social_provider.as_deref(), Some("GOOGLE"));
    }

    #[test]
    fn unknown_role_is_preserved() {
        let role = Role::from("AUDITOR");
        assert_eq!(role, Role::Other("AUDITOR".into()));
        assert_eq!(serde_json::to_value(&role).unwrap(), json!("AUDITOR"));
        assert_eq!(Role::from("admin"), Role::Admin);
    }

    #[test]
    fn missing_role_defaults_to_user() {
        let profile: UserProfile =
            serde_json::from_value(json!({"id": "u1", "username": "bob"})).unwrap();

        assert_eq!(profile.role, Role::User);
        assert!(profile.permissions.is_none());
        assert_eq!(profile.display_name(), "bob");
    }
}
