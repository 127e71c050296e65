//! # Bulletin Core
//!
//! The domain layer of the Bulletin publishing platform.
//! This crate contains the listing, authoring and pagination policy with zero infrastructure
//! dependencies: storage and identity are reached through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use pagination::{Page, PageRequest, Paginator};
