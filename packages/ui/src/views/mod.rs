mod drawer;
pub use drawer::Drawer;

mod users;
pub use users::UsersView;
