use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Duration;

use crate::error::StoreError;
use crate::models::{CreateUserPayload, Role, Timestamp, UserRecord};
use crate::repo::{FileOptions, ListQuery, UserStore};

/// Minimum password length the store enforces.
const MIN_PASSWORD_LEN: usize = 8;

/// In-memory UserStore for testing and the demo build.
///
/// Records keep insertion order internally; [`list_users`](UserStore::list_users)
/// honours `created`/`-created` sorting. Failures can be queued with
/// [`fail_next_list`](MemoryStore::fail_next_list) and
/// [`fail_next_create`](MemoryStore::fail_next_create).
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<UserRecord>>>,
    list_failures: Arc<Mutex<VecDeque<StoreError>>>,
    create_failures: Arc<Mutex<VecDeque<StoreError>>>,
    next_id: Arc<AtomicU64>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `records`.
    pub fn with_users(records: Vec<UserRecord>) -> Self {
        let store = Self::new();
        *lock(&store.records) = records;
        store
    }

    /// A handful of sample users, used by the demo build.
    pub fn seeded() -> Self {
        let now = Timestamp::now();
        let sample = [
            ("Ada Lovelace", "ada@example.com", Role::Admin, true, Some(42.0), 1),
            ("Grace Hopper", "grace@example.com", Role::Moderator, true, Some(17.5), 2),
            ("", "anon@example.com", Role::Player, false, None, 3),
        ];
        let store = Self::new();
        let records = sample
            .into_iter()
            .map(|(name, email, role, verified, experience, days_ago)| {
                let created = Timestamp::new(*now.as_datetime() - Duration::days(days_ago));
                UserRecord {
                    id: store.allocate_id(),
                    collection_id: None,
                    collection_name: Some("users".to_string()),
                    email: email.to_string(),
                    name: Some(name.to_string()),
                    role,
                    verified,
                    email_visibility: verified,
                    experience,
                    avatar: None,
                    created,
                    updated: created,
                }
            })
            .collect();
        *lock(&store.records) = records;
        store
    }

    /// Make the next listing fail with `err`.
    pub fn fail_next_list(&self, err: StoreError) {
        lock(&self.list_failures).push_back(err);
    }

    /// Make the next create fail with `err`.
    pub fn fail_next_create(&self, err: StoreError) {
        lock(&self.create_failures).push_back(err);
    }

    /// Snapshot of the stored records in insertion order.
    pub fn records(&self) -> Vec<UserRecord> {
        lock(&self.records).clone()
    }

    fn allocate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("mem{n:012}")
    }

    fn validate(records: &[UserRecord], payload: &CreateUserPayload) -> Result<(), StoreError> {
        let mut fields = std::collections::BTreeMap::new();
        if payload.email.trim().is_empty() {
            fields.insert("email".to_string(), "Cannot be blank.".to_string());
        } else if records.iter().any(|r| r.email == payload.email) {
            fields.insert(
                "email".to_string(),
                "The email is invalid or already in use.".to_string(),
            );
        }
        if payload.password.len() < MIN_PASSWORD_LEN {
            fields.insert(
                "password".to_string(),
                format!("Must be at least {MIN_PASSWORD_LEN} character(s)."),
            );
        } else if payload.password != payload.password_confirm {
            fields.insert("passwordConfirm".to_string(), "Values don't match.".to_string());
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Response {
                status: 400,
                message: "Failed to create record.".to_string(),
                fields,
            })
        }
    }
}

impl UserStore for MemoryStore {
    async fn list_users(&self, query: &ListQuery) -> Result<Vec<UserRecord>, StoreError> {
        if let Some(err) = lock(&self.list_failures).pop_front() {
            return Err(err);
        }
        let mut users = self.records();
        match query.sort.as_str() {
            "-created" => users.sort_by(|a, b| b.created.cmp(&a.created)),
            "created" => users.sort_by(|a, b| a.created.cmp(&b.created)),
            _ => {}
        }
        Ok(users)
    }

    async fn create_user(&self, payload: CreateUserPayload) -> Result<UserRecord, StoreError> {
        if let Some(err) = lock(&self.create_failures).pop_front() {
            return Err(err);
        }
        let mut records = lock(&self.records);
        Self::validate(&records, &payload)?;
        let now = Timestamp::now();
        let record = UserRecord {
            id: self.allocate_id(),
            collection_id: None,
            collection_name: Some("users".to_string()),
            email: payload.email,
            name: Some(payload.name),
            role: payload.role,
            verified: false,
            email_visibility: payload.email_visibility,
            experience: payload.experience,
            avatar: payload.avatar.map(|a| a.file_name),
            created: now,
            updated: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    fn file_url(&self, record: &UserRecord, file: &str, options: &FileOptions) -> String {
        if file.is_empty() || record.id.is_empty() {
            return String::new();
        }
        let mut url = format!("memory://users/{}/{}", record.id, urlencoding::encode(file));
        if let Some(thumb) = &options.thumb {
            url.push_str("?thumb=");
            url.push_str(thumb);
        }
        url
    }
}
