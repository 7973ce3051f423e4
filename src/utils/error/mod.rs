//! Error handling for the governance pipeline
//!
//! This module defines the crate-wide error type and its helpers.

#![allow(missing_docs)]

mod helpers;
mod types;

pub use types::{GovernanceError, Result};
