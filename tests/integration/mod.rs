//! Integration tests for governance-gateway
//!
//! These tests drive the public API end to end; backends are either in-memory
//! or real HTTP servers provided by wiremock.

pub mod alerting_tests;
pub mod config_tests;
pub mod fallback_tests;
pub mod pipeline_tests;
