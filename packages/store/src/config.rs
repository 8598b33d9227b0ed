//! # Admin settings
//!
//! Runtime configuration for the admin panel, loaded with the `config` crate from
//! three layers (later wins):
//!
//! 1. built-in defaults (the `Default` impls below),
//! 2. an optional `admin.toml` in the working directory,
//! 3. environment variables prefixed `ADMIN`, nested with `__`
//!    (e.g. `ADMIN_STORE__URL`, `ADMIN_AVATAR__MAX_BYTES`).
//!
//! ```toml
//! [store]
//! url = "http://127.0.0.1:8090"
//! collection = "users"
//! sort = "-created"
//! batch_size = 1000
//! # token = "..."          # sent as `Authorization` when set
//!
//! [avatar]
//! max_bytes = 5242880
//! thumb = "100x100"
//! fallback_service = "https://ui-avatars.com/api/"
//! ```
//!
//! Browser builds cannot read files or the process environment, so
//! [`Settings::from_build_env`] takes the store URL from the `ADMIN_STORE_URL`
//! variable at compile time instead.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::repo::ListQuery;

/// Largest avatar accepted by default: 5 MiB.
pub const DEFAULT_MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// Top-level settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
}

/// Where and how to reach the user store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Bearer token for the store, if it requires one.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_url() -> String {
    "http://127.0.0.1:8090".to_string()
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_sort() -> String {
    "-created".to_string()
}

fn default_batch_size() -> u32 {
    1000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            collection: default_collection(),
            sort: default_sort(),
            batch_size: default_batch_size(),
            token: None,
        }
    }
}

impl StoreConfig {
    /// The listing query these settings describe.
    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            sort: self.sort.clone(),
            batch_size: self.batch_size,
        }
    }
}

/// Avatar upload and display settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AvatarConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_thumb")]
    pub thumb: String,
    /// Initials-avatar service used when a user has no avatar.
    #[serde(default = "default_fallback_service")]
    pub fallback_service: String,
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_AVATAR_BYTES
}

fn default_thumb() -> String {
    "100x100".to_string()
}

fn default_fallback_service() -> String {
    "https://ui-avatars.com/api/".to_string()
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            thumb: default_thumb(),
            fallback_service: default_fallback_service(),
        }
    }
}

impl Settings {
    /// The well-known filename for the settings file.
    pub fn filename() -> &'static str {
        "admin.toml"
    }

    /// Load defaults, then `admin.toml` if present, then `ADMIN_*` variables.
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(Self::filename())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("ADMIN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse settings from a TOML string, filling gaps with defaults.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(s, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Defaults with the store URL baked in at compile time, for browser builds.
    pub fn from_build_env() -> Self {
        let mut settings = Self::default();
        if let Some(url) = option_env!("ADMIN_STORE_URL") {
            settings.store.url = url.to_string();
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.store.url, "http://127.0.0.1:8090");
        assert_eq!(settings.store.list_query(), ListQuery::default());
        assert_eq!(settings.avatar.max_bytes, 5 * 1024 * 1024);
        assert_eq!(settings.avatar.thumb, "100x100");
    }

    #[test]
    fn test_from_toml_partial() {
        let settings = Settings::from_toml(
            r#"
            [store]
            url = "https://pb.example.com"
            batch_size = 200

            [avatar]
            max_bytes = 1024
            "#,
        )
        .unwrap();
        assert_eq!(settings.store.url, "https://pb.example.com");
        assert_eq!(settings.store.batch_size, 200);
        assert_eq!(settings.store.collection, "users");
        assert_eq!(settings.store.sort, "-created");
        assert_eq!(settings.avatar.max_bytes, 1024);
        assert_eq!(settings.avatar.fallback_service, "https://ui-avatars.com/api/");
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("ADMIN_STORE__COLLECTION", "members");
        let settings = Settings::new().unwrap();
        std::env::remove_var("ADMIN_STORE__COLLECTION");
        assert_eq!(settings.store.collection, "members");
        assert_eq!(settings.store.batch_size, 1000);
    }
}
