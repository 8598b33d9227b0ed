use dioxus::prelude::*;

use crate::Route;

/// Landing page.
#[component]
pub fn Home() -> Element {
    rsx! {
        main {
            class: "home",
            h1 { "Tune Admin" }
            p { class: "home-tagline", "Welcome to your admin dashboard." }
            div {
                class: "home-actions",
                Link {
                    class: "button primary",
                    to: Route::Users {},
                    "Manage Users"
                }
            }
        }
    }
}
