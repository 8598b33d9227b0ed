//! This crate contains the user admin UI: list and form state, the reducer that
//! ties them to a [`store::UserStore`], display mapping and the Dioxus views.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod repo;
pub use repo::{make_store, use_admin, AdminContext, AppStore, StoreProvider};

pub mod admin;
pub use admin::{AdminState, Effect, Message, UserAdmin};

pub mod presentation;
pub use presentation::UserRow;

pub mod user_form;
pub use user_form::{AvatarError, CreateUserForm, FormError, FormField};

pub mod user_list;
pub use user_list::{FetchMode, FetchTicket, UserList};

mod create_user_drawer;
pub use create_user_drawer::CreateUserDrawer;

pub mod views;
