pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::http::HttpVerifierChannel;
pub use config::verifier::VerifierConfig;
pub use core::engine::MetricsEngine;
pub use core::verifier::{VerificationOrchestrator, VerifierSettings};
pub use domain::model::MetricValue;
pub use domain::ports::VerificationChannel;
pub use utils::error::{MetricsError, Result};
