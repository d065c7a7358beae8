pub mod download;
pub mod list;
pub mod manage;
pub mod types;
pub mod upload;

pub use types::*;

pub use download::download_file;
pub use list::list_files;
pub use manage::delete_item;
pub use upload::upload_file;
