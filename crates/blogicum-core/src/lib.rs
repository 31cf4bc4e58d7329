//! # Blogicum Core
//!
//! The domain layer of the Blogicum blog platform.
//! Entities, visibility rules, pagination and form validation live here,
//! together with the ports infrastructure must implement.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod visibility;

pub use error::RepoError;
