//! Error handling for the Trut backend.

pub mod domain;

pub use domain::{DomainError, ExternalKind, PreconditionKind, ValidationKind};
