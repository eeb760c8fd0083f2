pub mod banner;
pub mod banner_tag;
pub mod tag;
pub mod user;
