use dioxus::prelude::*;
use ui::icons::FaUsers;
use ui::Icon;

use crate::Route;

/// Sidebar navigation around the admin pages.
#[component]
pub fn AdminLayout() -> Element {
    let route = use_route::<Route>();
    let users_class = if matches!(route, Route::Users {}) {
        "nav-item active"
    } else {
        "nav-item"
    };

    rsx! {
        div {
            class: "admin-layout",
            nav {
                class: "admin-sidebar",
                h3 { "Pages" }
                Link {
                    class: users_class,
                    to: Route::Users {},
                    Icon { icon: FaUsers, width: 16, height: 16 }
                    span { "User Management" }
                }
            }
            div {
                class: "admin-main",
                Outlet::<Route> {}
            }
        }
    }
}
