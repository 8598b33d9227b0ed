use dioxus::prelude::*;
use store::Settings;
use tracing::Level;

use views::{AdminLayout, Home, Users};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Home {},
    #[layout(AdminLayout)]
        #[route("/users")]
        Users {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    if let Err(err) = dioxus::logger::init(Level::INFO) {
        eprintln!("failed to initialize logger: {err}");
    }
    dioxus::launch(App);
}

/// Browser builds read the store URL baked in at compile time; native builds
/// read `admin.toml` and `ADMIN_*` variables.
fn load_settings() -> Settings {
    #[cfg(target_arch = "wasm32")]
    {
        Settings::from_build_env()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Settings::new().unwrap_or_else(|err| {
            tracing::warn!("invalid settings, using defaults: {err}");
            Settings::default()
        })
    }
}

#[component]
fn App() -> Element {
    let settings = use_hook(load_settings);

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        ui::StoreProvider {
            settings,
            Router::<Route> {}
        }
    }
}
