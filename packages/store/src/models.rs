//! # Domain models for user records and create payloads
//!
//! Defines the data structures exchanged with a [`crate::UserStore`]. Records are
//! `Serialize + Deserialize` in the store's camelCase wire shape so the same types
//! work for the HTTP client, the in-memory store and test fixtures.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`UserRecord`] | A user as returned by the store. Everything except `id` and `email` is optional on the wire and defaults sensibly. |
//! | [`Role`] | The account role. Known roles are `player`, `admin` and `moderator`; anything else is kept verbatim as [`Role::Other`]. |
//! | [`Timestamp`] | A store-assigned UTC instant. Accepts both RFC 3339 and the store's `YYYY-MM-DD HH:MM:SS.sssZ` layout. |
//! | [`AvatarFile`] | An image picked on the client, held in memory until it is uploaded. |
//! | [`CreateUserPayload`] | The body of a create request. `avatar` travels as a file part, never as JSON. |

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Layout the store uses for `created`/`updated`.
const STORE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.fZ";

/// Account role of a user.
///
/// An empty or missing value deserializes as [`Role::Player`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Player,
    Admin,
    Moderator,
    /// A role this client does not know about, kept as sent.
    Other(String),
}

impl Role {
    /// Parse a raw role value. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "player" => Role::Player,
            "admin" => Role::Admin,
            "moderator" => Role::Moderator,
            other => Role::Other(other.to_string()),
        }
    }

    /// The wire value of the role.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Player => "player",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Other(raw) => raw,
        }
    }

    /// Roles an administrator may assign from the create form.
    pub fn assignable() -> [Role; 3] {
        [Role::Player, Role::Admin, Role::Moderator]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Role::parse).unwrap_or_default())
    }
}

/// A UTC instant assigned by the store.
///
/// Defaults to the Unix epoch, which is also what an empty wire value maps to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse either RFC 3339 or the store layout (`2024-01-02 10:00:00.000Z`).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(Self::default());
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self(at.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(raw, STORE_TIME_FORMAT)
            .ok()
            .map(|naive| Self(naive.and_utc()))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.format("%Y-%m-%d %H:%M:%S%.3fZ"))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Timestamp::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))
    }
}

/// A user record held by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Opaque identifier assigned by the store.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub email_visibility: bool,
    #[serde(default)]
    pub experience: Option<f64>,
    /// Stored file name of the avatar, if any.
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created: Timestamp,
    #[serde(default)]
    pub updated: Timestamp,
}

impl UserRecord {
    /// The name if set, ignoring empty strings.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Get display name, falling back to email if name is not set.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(&self.email)
    }

    /// The avatar file reference if set, ignoring empty strings.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref().filter(|a| !a.is_empty())
    }
}

/// An image selected for upload.
#[derive(Clone, PartialEq)]
pub struct AvatarFile {
    pub file_name: String,
    /// Media type, e.g. `image/png`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for AvatarFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarFile")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Fields sent to the store to create a user.
///
/// Travels as `multipart/form-data`: [`text_fields`](Self::text_fields) plus an
/// optional `avatar` file part.
#[derive(Clone, PartialEq)]
pub struct CreateUserPayload {
    pub email: String,
    pub password: String,
    /// The store requires this to equal `password`.
    pub password_confirm: String,
    pub name: String,
    pub role: Role,
    pub email_visibility: bool,
    pub experience: Option<f64>,
    pub avatar: Option<AvatarFile>,
}

impl CreateUserPayload {
    /// Text fields in wire order, as sent in a multipart body.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("passwordConfirm", self.password_confirm.clone()),
            ("name", self.name.clone()),
            ("role", self.role.as_str().to_string()),
            ("emailVisibility", self.email_visibility.to_string()),
        ];
        if let Some(experience) = self.experience {
            fields.push(("experience", experience.to_string()));
        }
        fields
    }
}

impl fmt::Debug for CreateUserPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserPayload")
            .field("email", &self.email)
            .field("password", &"***")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("email_visibility", &self.email_visibility)
            .field("experience", &self.experience)
            .field("avatar", &self.avatar)
            .finish()
    }
}
