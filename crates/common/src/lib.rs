//! Wire types and the HTTP-facing error shared by the `credvault` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
