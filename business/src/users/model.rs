//! User roster types and the remote → local record mapping.
//!
//! The remote service and the console disagree on field names (`name` vs
//! `display_name`, snake-case timestamps, numeric ids). All translation happens in
//! [`TryFrom<RemoteUserRecord> for UserRecord`]; nothing else in the crate reads a
//! [`RemoteUserRecord`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use ustr::Ustr;

/// Closed set of roles an account may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Cashier,
    Admin,
    Manager,
    Superadmin,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Cashier, Self::Admin, Self::Manager, Self::Superadmin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cashier => "cashier",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Exact, case-sensitive match. `"Admin"` is not a role.
impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "role",
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Invited,
    Suspended,
}

impl UserStatus {
    pub const ALL: [Self; 4] = [Self::Active, Self::Inactive, Self::Invited, Self::Suspended];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Invited => "invited",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_owned(),
            })
    }
}

/// Opaque server-assigned identifier. The service sends integers today; strings are
/// accepted too so the console never has to care.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Canonical roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub display_name: String,
    /// Unique; the only value accepted as a delete confirmation token.
    pub username: Ustr,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire shape of `GET /users` entries.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUserRecord {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub status: String,
    pub role: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<RemoteUserRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote user `{username}` has {source}")]
pub struct RecordMappingError {
    pub username: String,
    pub source: UnknownVariant,
}

impl TryFrom<RemoteUserRecord> for UserRecord {
    type Error = RecordMappingError;

    fn try_from(remote: RemoteUserRecord) -> Result<Self, Self::Error> {
        let role = remote.role.parse::<Role>();
        let status = remote.status.parse::<UserStatus>();
        let (role, status) = match (role, status) {
            (Ok(role), Ok(status)) => (role, status),
            (Err(source), _) | (_, Err(source)) => {
                return Err(RecordMappingError {
                    username: remote.username,
                    source,
                });
            }
        };

        Ok(Self {
            id: remote.id,
            display_name: remote.name,
            username: Ustr::from(&remote.username),
            email: remote.email.to_lowercase(),
            phone_number: remote.phone_number,
            role,
            status,
            created_at: remote.created_at.as_deref().and_then(parse_timestamp),
            updated_at: remote.updated_at.as_deref().and_then(parse_timestamp),
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(role: &str, status: &str) -> RemoteUserRecord {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Ada Lovelace",
            "username": "Ada",
            "email": "Ada@Example.COM",
            "phone_number": "5551234567",
            "status": status,
            "role": role,
        }))
        .unwrap()
    }

    #[test]
    fn role_parsing_is_exact() {
        assert_eq!("cashier".parse::<Role>(), Ok(Role::Cashier));
        assert_eq!("superadmin".parse::<Role>(), Ok(Role::Superadmin));
        assert!("Admin".parse::<Role>().is_err());
        assert!("owner".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn remote_record_maps_field_by_field() {
        let record = UserRecord::try_from(remote("manager", "invited")).unwrap();

        assert_eq!(record.id, UserId::new("7"));
        assert_eq!(record.display_name, "Ada Lovelace");
        // Usernames are confirmation tokens and stay verbatim.
        assert_eq!(record.username.as_str(), "Ada");
        assert_eq!(record.email, "ada@example.com");
        assert_eq!(record.phone_number, "5551234567");
        assert_eq!(record.role, Role::Manager);
        assert_eq!(record.status, UserStatus::Invited);
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn unknown_role_is_rejected_not_defaulted() {
        let err = UserRecord::try_from(remote("owner", "active")).unwrap_err();
        assert_eq!(err.username, "Ada");
        assert_eq!(err.source.kind, "role");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = UserRecord::try_from(remote("admin", "banned")).unwrap_err();
        assert_eq!(err.source.kind, "status");
        assert_eq!(err.source.value, "banned");
    }

    #[test]
    fn string_ids_and_timestamps_are_accepted() {
        let remote: RemoteUserRecord = serde_json::from_value(serde_json::json!({
            "id": "u-1",
            "name": "Bob",
            "username": "bob",
            "email": "bob@example.com",
            "phone_number": "1",
            "status": "active",
            "role": "cashier",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "not a date",
        }))
        .unwrap();

        let record = UserRecord::try_from(remote).unwrap();
        assert_eq!(record.id.as_str(), "u-1");
        assert!(record.created_at.is_some());
        assert_eq!(record.updated_at, None);
    }
}
