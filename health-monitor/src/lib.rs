//! Health Monitor Library
//!
//! Samples CPU, memory, disk, and process-count metrics once and raises a
//! warning log line for every metric above its threshold.

pub mod checks;
pub mod logger;
pub mod sampler;
pub mod thresholds;

pub use checks::{evaluate, Alert, Metric};
pub use sampler::HealthSnapshot;
pub use thresholds::Thresholds;
