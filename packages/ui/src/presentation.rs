//! Display derivations for user records. Every function here is total: any
//! record, however sparse, produces something drawable.

use store::config::AvatarConfig;
use store::{FileOptions, Role, Timestamp, UserRecord, UserStore};

/// Label and style of a role pill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleBadge {
    pub label: String,
    pub class: &'static str,
}

/// Label and style of the verification pill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub class: &'static str,
}

/// Everything a table row shows for one user.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRow {
    /// The full id, used as the row key.
    pub key: String,
    pub short_id: String,
    pub display_name: String,
    pub avatar_url: String,
    pub avatar_alt: String,
    pub email: String,
    pub email_visibility: &'static str,
    pub role: RoleBadge,
    pub status: StatusBadge,
    pub experience: String,
    pub joined: String,
    pub last_updated: String,
}

impl UserRow {
    pub fn new<S: UserStore>(store: &S, avatar: &AvatarConfig, user: &UserRecord) -> Self {
        Self {
            key: user.id.clone(),
            short_id: short_id(&user.id),
            display_name: user.name().unwrap_or("No Name").to_string(),
            avatar_url: avatar_url(store, avatar, user),
            avatar_alt: user.name().unwrap_or("User Avatar").to_string(),
            email: user.email.clone(),
            email_visibility: if user.email_visibility {
                "Public"
            } else {
                "Private"
            },
            role: role_badge(&user.role),
            status: status_badge(user.verified),
            experience: experience_label(user.experience),
            joined: format_date(&user.created),
            last_updated: format_date(&user.updated),
        }
    }
}

/// Thumbnail of the stored avatar, or an initials avatar keyed by name (or email).
pub fn avatar_url<S: UserStore>(store: &S, config: &AvatarConfig, user: &UserRecord) -> String {
    match user.avatar() {
        Some(file) => store.file_url(user, file, &FileOptions::thumb(config.thumb.as_str())),
        None => format!(
            "{}?name={}&background=random",
            config.fallback_service,
            urlencoding::encode(user.display_name())
        ),
    }
}

/// Capitalized role with its colour class; unknown roles get player styling.
pub fn role_badge(role: &Role) -> RoleBadge {
    let class = match role {
        Role::Admin => "badge badge--admin",
        Role::Moderator => "badge badge--moderator",
        Role::Player | Role::Other(_) => "badge badge--player",
    };
    RoleBadge {
        label: capitalize(role.as_str()),
        class,
    }
}

pub fn status_badge(verified: bool) -> StatusBadge {
    if verified {
        StatusBadge {
            label: "Verified",
            class: "badge badge--verified",
        }
    } else {
        StatusBadge {
            label: "Pending",
            class: "badge badge--pending",
        }
    }
}

/// Calendar date in en-US short form, e.g. `Jan 2, 2024`.
///
/// The date is taken in UTC, so a record created late in the evening west of
/// Greenwich shows the next day.
pub fn format_date(at: &Timestamp) -> String {
    at.as_datetime().format("%b %-d, %Y").to_string()
}

/// First eight characters of an id, then an ellipsis. Display only.
pub fn short_id(id: &str) -> String {
    let head: String = id.chars().take(8).collect();
    format!("{head}...")
}

/// The experience value, or "Not specified" when missing or zero.
pub fn experience_label(experience: Option<f64>) -> String {
    match experience {
        Some(value) if value != 0.0 && !value.is_nan() => value.to_string(),
        _ => "Not specified".to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
