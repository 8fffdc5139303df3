pub mod sessions;

pub use sessions::CurrentUser;
