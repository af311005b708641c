//! # dockhound-common
//!
//! Shared error types used across the dockhound crates.

#![warn(missing_docs)]

pub mod error;

pub use error::{DockhoundError, DockhoundResult};
