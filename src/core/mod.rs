//! Core governance components
//!
//! Each component owns its state behind a single lock and is composed by the
//! request pipeline.

pub mod budget;
pub mod cache;
pub mod pipeline;
pub mod quality;
pub mod rate_limiter;
pub mod router;
pub mod types;
