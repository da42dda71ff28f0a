//! # Agora Core
//!
//! The domain layer of the Agora research network: posts, likes, comments,
//! follows and feed assembly.
//! This crate contains pure business logic with zero infrastructure dependencies;
//! storage is reached only through the [`ports::DocumentStore`] trait.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, DomainResult, ErrorKind, StoreError};
