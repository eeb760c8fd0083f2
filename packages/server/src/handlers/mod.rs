pub mod banner;
pub mod user;
