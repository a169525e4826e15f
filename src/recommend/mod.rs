//! Rule-based recommendation pipeline.

pub mod triage;
pub mod notes;
pub mod selector;
pub mod dose;
pub mod safety;
pub mod format;
pub mod timing;
pub mod types;
pub mod engine;

pub use engine::RecommendationEngine;
pub use types::*;
