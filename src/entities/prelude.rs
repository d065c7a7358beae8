pub use super::files::Entity as Files;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
