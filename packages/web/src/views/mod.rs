mod home;
pub use home::Home;

mod layout;
pub use layout::AdminLayout;

mod users;
pub use users::Users;
