//! Generation backends and the fallback orchestrator
//!
//! This module walks the configured backend chain for every generation:
//!
//! - `backend` - The generation capability implemented per backend
//! - `error` - Backend errors and per-attempt records
//! - `fallback` - Ordered fallback with a shared deadline and cancellation
//! - `local` - Deterministic offline synthesis used as the last resort
//! - `stats` - Per-backend attempt statistics

mod backend;
mod error;
mod fallback;
mod local;
mod stats;


pub use backend::{GenerationBackend, GenerationRequest, GenerationResponse};
pub use error::{AttemptRecord, BackendError};
pub use fallback::{FallbackOrchestrator, FallbackOutcome, GenerationSource};
pub use local::LocalSynthesizer;
pub use stats::BackendStats;
