//! Alerting: everything that turns a raw value into a severity.
//!
//! Submodules:
//! - `status`     - vehicle status digit → severity class lookup table.
//! - `thresholds` - water level vs. pre-alert / alert thresholds.

pub mod status;
pub mod thresholds;

pub use status::StatusTable;
pub use thresholds::classify_level;
