//! SeaORM entity definitions.

pub mod group;
pub mod post;
pub mod user;
