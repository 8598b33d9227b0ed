//! Client-side access to the backend that owns user records.

pub mod config;
pub mod error;
pub mod models;
pub mod pocketbase;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

pub use config::Settings;
pub use error::StoreError;
pub use models::{AvatarFile, CreateUserPayload, Role, Timestamp, UserRecord};
pub use pocketbase::PocketBaseStore;
pub use repo::{FileOptions, ListQuery, UserStore};
