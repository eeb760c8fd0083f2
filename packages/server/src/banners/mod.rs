//! Banner and tag data management plus the user-facing read path.
//!
//! Every component borrows a [`ConnectionTrait`](sea_orm::ConnectionTrait) for the
//! duration of one logical operation; callers decide the transaction scope,
//! usually through a [`Session`].

mod associations;
mod resolver;
mod session;
mod store;
mod tags;

pub use associations::AssociationManager;
pub use resolver::{BannerCache, BannerResolver, ReadMode};
pub use session::Session;
pub use store::{Banner, BannerFilter, BannerPatch, BannerStore, NewBanner};
pub use tags::TagRegistry;
