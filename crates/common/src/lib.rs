//! Common types, protocol definitions, and errors shared across `text-vault` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
