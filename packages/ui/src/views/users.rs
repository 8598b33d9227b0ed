use dioxus::prelude::*;
use tracing::debug;

use crate::admin::{perform, AdminState, Effect, Message};
use crate::icons::{FaRotate, FaUserPlus, FaUsers};
use crate::presentation::UserRow;
use crate::repo::{use_admin, AdminContext};
use crate::{CreateUserDrawer, Icon};

/// Apply `message` to `state` and run whatever store call it asks for. The
/// outcome is fed back in as the next message.
fn dispatch(mut state: Signal<AdminState>, admin: AdminContext, message: Message) {
    debug!("users message: {}", message.sanitized_display());
    let effect = state.write().update(message);
    if matches!(effect, Effect::None) {
        return;
    }
    spawn(async move {
        let query = admin.query();
        if let Some(next) = perform(&admin.store, &query, effect).await {
            dispatch(state, admin, next);
        }
    });
}

/// The user management page: header actions, the user table and the create drawer.
#[component]
pub fn UsersView() -> Element {
    let admin = use_admin();
    let state = use_signal(|| AdminState::new(admin.settings.avatar.max_bytes));

    let send = use_callback({
        let admin = admin.clone();
        move |message: Message| dispatch(state, admin.clone(), message)
    });

    // Initial load on mount
    use_effect(move || send.call(Message::Load));

    let current = state.read();
    let list = &current.list;

    if list.is_loading() {
        return rsx! {
            div {
                class: "users-loading",
                div { class: "spinner" }
            }
        };
    }

    if let Some(error) = list.error() {
        return rsx! {
            div {
                class: "users-page",
                div {
                    class: "users-error",
                    p { "Error: {error}" }
                    button {
                        class: "secondary",
                        onclick: move |_| send.call(Message::Refresh),
                        "Try again"
                    }
                }
            }
        };
    }

    let refreshing = list.is_refreshing();
    let rows: Vec<UserRow> = list
        .items()
        .iter()
        .map(|user| UserRow::new(&admin.store, &admin.settings.avatar, user))
        .collect();

    rsx! {
        div {
            class: "users-page",

            div {
                class: "users-header",
                div {
                    h1 { "User Management" }
                    p { class: "users-subtitle", "Manage your application users" }
                }
                div {
                    class: "users-actions",
                    button {
                        class: "secondary",
                        disabled: refreshing,
                        onclick: move |_| send.call(Message::Refresh),
                        Icon { icon: FaRotate, width: 14, height: 14 }
                        if refreshing { "Refreshing..." } else { "Refresh" }
                    }
                    button {
                        class: "primary",
                        onclick: move |_| send.call(Message::OpenCreate),
                        Icon { icon: FaUserPlus, width: 14, height: 14 }
                        "Add User"
                    }
                }
            }

            div {
                class: "users-card",
                UserTable { rows }
            }

            if current.is_create_open() {
                CreateUserDrawer { state, on_message: send }
            }
        }
    }
}

#[component]
fn UserTable(rows: Vec<UserRow>) -> Element {
    if rows.is_empty() {
        return rsx! {
            div {
                class: "users-empty",
                Icon { icon: FaUsers, width: 48, height: 48 }
                p { class: "users-empty-title", "No users found" }
                p { "Get started by adding your first user." }
            }
        };
    }

    rsx! {
        table {
            class: "users-table",
            thead {
                tr {
                    th { "User" }
                    th { "Email" }
                    th { "Role" }
                    th { "Status" }
                    th { "Experience" }
                    th { "Joined" }
                    th { "Last Updated" }
                }
            }
            tbody {
                for row in rows {
                    tr {
                        key: "{row.key}",
                        td {
                            div {
                                class: "user-cell",
                                img {
                                    class: "avatar",
                                    src: "{row.avatar_url}",
                                    alt: "{row.avatar_alt}",
                                }
                                div {
                                    div { class: "user-name", "{row.display_name}" }
                                    div { class: "user-id", "ID: {row.short_id}" }
                                }
                            }
                        }
                        td {
                            div { "{row.email}" }
                            div {
                                class: visibility_class(row.email_visibility),
                                "{row.email_visibility}"
                            }
                        }
                        td { span { class: row.role.class, "{row.role.label}" } }
                        td { span { class: row.status.class, "{row.status.label}" } }
                        td { "{row.experience}" }
                        td { class: "muted", "{row.joined}" }
                        td { class: "muted", "{row.last_updated}" }
                    }
                }
            }
        }
    }
}

fn visibility_class(label: &str) -> &'static str {
    if label == "Public" {
        "visibility visibility--public"
    } else {
        "visibility"
    }
}
