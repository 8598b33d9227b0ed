//! # User store interface
//!
//! [`UserStore`] is the narrow interface the admin UI uses to talk to the backend
//! that owns user records. It has exactly three operations:
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`list_users`](UserStore::list_users) | Fetch the whole collection in one logical call. Implementations may page internally but never expose paging. |
//! | [`create_user`](UserStore::create_user) | Create a record and return the store's authoritative copy of it. |
//! | [`file_url`](UserStore::file_url) | Build the URL of a stored file. Pure; an unusable input yields an empty string. |
//!
//! Implementations live in sibling modules ([`crate::pocketbase`], [`crate::memory`]).
//! The futures are not required to be `Send`: everything runs on the browser's
//! single-threaded executor.

use crate::error::StoreError;
use crate::models::{CreateUserPayload, UserRecord};

/// Ordering and page size for a bulk listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    /// Sort expression, `-` prefix for descending.
    pub sort: String,
    /// Records requested per underlying page.
    pub batch_size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            sort: "-created".to_string(),
            batch_size: 1000,
        }
    }
}

/// Options for [`UserStore::file_url`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Thumbnail size as `WxH`, e.g. `100x100`.
    pub thumb: Option<String>,
}

impl FileOptions {
    pub fn thumb(size: impl Into<String>) -> Self {
        Self {
            thumb: Some(size.into()),
        }
    }
}

/// Async interface to the backend holding user records.
pub trait UserStore {
    fn list_users(
        &self,
        query: &ListQuery,
    ) -> impl std::future::Future<Output = Result<Vec<UserRecord>, StoreError>>;
    fn create_user(
        &self,
        payload: CreateUserPayload,
    ) -> impl std::future::Future<Output = Result<UserRecord, StoreError>>;
    fn file_url(&self, record: &UserRecord, file: &str, options: &FileOptions) -> String;
}
