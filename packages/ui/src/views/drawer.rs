use dioxus::prelude::*;

/// A side panel over a dimmed backdrop. Clicking the backdrop triggers `on_close`.
#[component]
pub fn Drawer(
    title: String,
    #[props(default)] description: Option<String>,
    on_close: EventHandler<()>,
    children: Element,
) -> Element {
    rsx! {
        div {
            class: "drawer-backdrop",
            onclick: move |_| on_close.call(()),
            aside {
                class: "drawer",
                role: "dialog",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),
                div {
                    class: "drawer-header",
                    h2 { "{title}" }
                    if let Some(description) = description {
                        p { class: "drawer-description", "{description}" }
                    }
                }
                {children}
            }
        }
    }
}
