//! Regen Economics Module
//!
//! Budget-conserving reward allocation:
//! - Exact integer split of a budget across weighted recipients
//! - Deterministic remainder tie-breaking (highest weight first, then index)
//! - Reference authority compensation scenario (validator / burn / community pools)

pub mod allocation;
pub mod distribution;
pub mod errors;
pub mod types;

pub use allocation::*;
pub use distribution::*;
pub use errors::*;
pub use types::*;

/// Module version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
