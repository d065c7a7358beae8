pub mod prelude;

pub mod files;
pub mod sessions;
pub mod users;
