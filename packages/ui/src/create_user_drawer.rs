use dioxus::prelude::*;
use store::{AvatarFile, Role};

use crate::admin::{AdminState, Message};
use crate::presentation::role_badge;
use crate::user_form::{media_type_for, FormField};
use crate::views::Drawer;

/// Drawer form for creating a user. All changes go out through `on_message`.
#[component]
pub fn CreateUserDrawer(state: Signal<AdminState>, on_message: EventHandler<Message>) -> Element {
    let admin = state.read();
    let form = &admin.form;
    let creating = form.is_creating();
    let can_submit = form.is_submittable() && !creating;

    let field = move |field: FormField| {
        move |evt: FormEvent| on_message.call(Message::FieldChanged(field, evt.value()))
    };

    let handle_avatar = move |evt: FormEvent| async move {
        let Some(engine) = evt.files() else {
            return;
        };
        let Some(file_name) = engine.files().into_iter().next() else {
            return;
        };
        let media_type = media_type_for(&file_name);
        let size = engine.file_size(&file_name).await.unwrap_or(0);
        // Refuse by type and size before pulling the contents into memory.
        if let Err(err) = state.peek().form.screen_avatar(media_type, size) {
            tracing::debug!(file = %file_name, "avatar refused before read: {err}");
            on_message.call(Message::AvatarRejected(err));
            reset_avatar_input();
            return;
        }
        match engine.read_file(&file_name).await {
            Some(bytes) => {
                let file = AvatarFile::new(file_name, media_type, bytes);
                let refused = state.peek().form.screen_avatar(media_type, file.size()).is_err();
                on_message.call(Message::AvatarSelected(file));
                if refused {
                    reset_avatar_input();
                }
            }
            None => tracing::warn!(file = %file_name, "could not read selected avatar"),
        }
    };

    rsx! {
        Drawer {
            title: "Add New User",
            description: "Create a new user account. All fields marked with * are required.",
            on_close: move |_| on_message.call(Message::CloseCreate),

            form {
                class: "drawer-form",
                onsubmit: move |evt: FormEvent| {
                    evt.prevent_default();
                    on_message.call(Message::Submit);
                },

                div {
                    class: "form-field",
                    label { r#for: "new-user-email", "Email *" }
                    input {
                        id: "new-user-email",
                        r#type: "email",
                        required: true,
                        autofocus: true,
                        value: form.email(),
                        oninput: field(FormField::Email),
                    }
                }

                div {
                    class: "form-field",
                    label { r#for: "new-user-password", "Password *" }
                    input {
                        id: "new-user-password",
                        r#type: "password",
                        required: true,
                        minlength: "8",
                        value: form.password(),
                        oninput: field(FormField::Password),
                    }
                }

                div {
                    class: "form-field",
                    label { r#for: "new-user-name", "Name" }
                    input {
                        id: "new-user-name",
                        r#type: "text",
                        value: form.name(),
                        oninput: field(FormField::Name),
                    }
                }

                div {
                    class: "form-field",
                    label { r#for: "new-user-role", "Role" }
                    select {
                        id: "new-user-role",
                        value: form.role().as_str(),
                        onchange: field(FormField::Role),
                        for role in Role::assignable() {
                            option {
                                key: "{role}",
                                value: role.as_str(),
                                selected: form.role() == &role,
                                {role_badge(&role).label}
                            }
                        }
                    }
                }

                div {
                    class: "form-field",
                    label { r#for: "new-user-experience", "Experience (optional)" }
                    input {
                        id: "new-user-experience",
                        r#type: "number",
                        step: "0.1",
                        value: form.experience(),
                        oninput: field(FormField::Experience),
                    }
                    if let Some(message) = form.experience_error() {
                        p { class: "form-error", "{message}" }
                    }
                }

                div {
                    class: "form-field",
                    label { r#for: "new-user-avatar", "Avatar (optional)" }
                    input {
                        id: "new-user-avatar",
                        r#type: "file",
                        accept: "image/*",
                        onchange: handle_avatar,
                    }
                    if let Some(avatar) = form.avatar() {
                        div {
                            class: "avatar-preview",
                            img {
                                src: avatar.preview_url(),
                                alt: "Avatar preview",
                            }
                            span { {avatar.file().file_name.clone()} }
                            button {
                                r#type: "button",
                                class: "link",
                                onclick: move |_| on_message.call(Message::AvatarCleared),
                                "Remove"
                            }
                        }
                    }
                    if let Some(message) = form.avatar_error() {
                        p { class: "form-error", "{message}" }
                    }
                }

                if let Some(err) = form.submit_error() {
                    div {
                        class: "form-error",
                        p { "{err}" }
                        ul {
                            for (name, message) in err.field_errors() {
                                li { key: "{name}", "{name}: {message}" }
                            }
                        }
                    }
                }

                div {
                    class: "form-actions",
                    button {
                        r#type: "submit",
                        class: "primary",
                        disabled: !can_submit,
                        if creating { "Creating..." } else { "Create User" }
                    }
                    button {
                        r#type: "button",
                        class: "secondary",
                        disabled: creating,
                        onclick: move |_| on_message.call(Message::CloseCreate),
                        "Cancel"
                    }
                }
            }
        }
    }
}

/// Empty the file picker so choosing the same file again fires `onchange`.
fn reset_avatar_input() {
    document::eval(r#"document.getElementById("new-user-avatar").value = "";"#);
}
