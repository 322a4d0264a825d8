//! Analysis and result aggregation modules
//!
//! Combines the stage outputs into the final result:
//! - Summary statistics (the reporting contract)
//! - Result types
//! - Run metadata
//! - Quality scoring

pub mod metadata;
pub mod quality;
pub mod result;
pub mod summary;
