//! Store constructor and app-wide store context.
//!
//! Returns the [`store::UserStore`] the build was configured for:
//! - **default**: the remote record store via [`store::PocketBaseStore`]
//! - **`demo` feature**: a seeded in-process [`store::MemoryStore`]

use dioxus::prelude::*;
use store::{ListQuery, Settings};

#[cfg(not(feature = "demo"))]
pub type AppStore = store::PocketBaseStore;
#[cfg(feature = "demo")]
pub type AppStore = store::MemoryStore;

/// Create the store described by `settings`.
pub fn make_store(settings: &Settings) -> AppStore {
    #[cfg(not(feature = "demo"))]
    {
        tracing::info!(url = %settings.store.url, collection = %settings.store.collection, "using remote user store");
        store::PocketBaseStore::new(&settings.store)
    }
    #[cfg(feature = "demo")]
    {
        tracing::info!(collection = %settings.store.collection, "using seeded in-memory user store");
        store::MemoryStore::seeded()
    }
}

/// The store and settings shared by every admin view.
#[derive(Clone)]
pub struct AdminContext {
    pub store: AppStore,
    pub settings: Settings,
}

impl AdminContext {
    pub fn query(&self) -> ListQuery {
        self.settings.store.list_query()
    }
}

/// Get the admin context provided by [`StoreProvider`].
pub fn use_admin() -> AdminContext {
    use_context::<AdminContext>()
}

/// Builds the store once from `settings` and provides it to its children.
#[component]
pub fn StoreProvider(settings: Settings, children: Element) -> Element {
    use_context_provider(move || AdminContext {
        store: make_store(&settings),
        settings,
    });

    rsx! {
        {children}
    }
}
