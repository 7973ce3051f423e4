//! Common test utilities for governance-gateway
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{backends, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let primary = backends::MockBackend::ok("primary", 1000);
//!     let governor = fixtures::governor(fixtures::config(), vec![primary]);
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod backends;
pub mod fixtures;

pub use backends::{HttpBackend, MockBackend};
