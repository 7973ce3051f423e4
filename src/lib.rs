//! # Governance Gateway
//!
//! Request governance for AI recipe generation shared by many tenants.
//!
//! ## Features
//!
//! - **Multi-tier rate limiting**: global and per-tenant calendar windows plus a monthly unit quota
//! - **Budget ledger**: rate-card pricing with volume discounts, daily and monthly ceilings
//! - **Quality gate**: weighted multi-dimension scoring with a single bounded retry
//! - **Fallback orchestration**: ordered backends under one deadline, degrading to local synthesis
//! - **Alerting**: deduplicated, suppressible alerts with bounded asynchronous notification
//! - **Health checks**: per-component status rolled into one report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use governance_gateway::{Config, GenerationRequest, Governor};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/governor.yaml").await?;
//!     let governor = Governor::builder(config).build()?;
//!     let shutdown = CancellationToken::new();
//!     governor.start(shutdown.clone());
//!
//!     let request = GenerationRequest::new("tenant-42", "weeknight", "Quick chicken dinner");
//!     let response = governor.process(request, &shutdown).await?;
//!     println!("{} via {}", response.recipe.title, response.source.backend());
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod monitoring;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GovernanceError, Result};

pub use core::pipeline::{GovernedResponse, Governor, GovernorBuilder, PipelineStage};
pub use core::router::{
    BackendError, GenerationBackend, GenerationRequest, GenerationResponse, GenerationSource,
};
pub use core::types::{Ingredient, NutritionInfo, Recipe};
pub use monitoring::{Alert, AlertSeverity, HealthReport, HealthState};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
