//! Regen Monetary: Dynamic Supply Model & Validation Audit
//!
//! Deterministic, epoch-stepped simulation of the Regen fee-routing and
//! supply governor:
//! - Seeded synthetic throughput and ecological-index signals
//! - Supply governor minting to cover validator deficits and burning surplus
//! - Self-tuning controllers (threshold hysteresis, PID) with hard gain bounds
//! - EIP-1559-style basefee baseline for comparison
//! - Metrics, composite confidence score, parameter sweeps
//!
//! Amounts are `f64` REGEN; one epoch models one week of chain activity.

pub mod audit;
pub mod basefee;
pub mod confidence;
pub mod config;
pub mod controller;
pub mod errors;
pub mod feed;
pub mod governor;
pub mod metrics;
pub mod sensitivity;
pub mod signals;
pub mod simulation;
pub mod sweep;
pub mod types;

pub use audit::*;
pub use basefee::*;
pub use confidence::*;
pub use config::*;
pub use controller::*;
pub use errors::*;
pub use feed::*;
pub use governor::*;
pub use metrics::*;
pub use sensitivity::*;
pub use signals::*;
pub use simulation::*;
pub use sweep::*;
pub use types::*;

/// Module version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
