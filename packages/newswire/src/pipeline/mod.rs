//! Pipeline orchestration: the duplicate gate and per-item processing.

pub mod duplicate;
pub mod process;

pub use duplicate::{DuplicateGate, Fingerprint};
pub use process::Pipeline;
