pub mod image;
pub mod user;
