//! hopcost-core: cost-efficiency analysis of optimized vs unoptimized
//! multi-hop transfers.
//!
//! Data flow: generator or ingestion -> store -> aggregator ->
//! comparator / scaling analyzer -> `AnalysisResult` -> export / report.

pub mod aggregator;
pub mod comparator;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod generator;
pub mod report;
pub mod sample;
pub mod scaling;
pub mod store;
pub mod types;

pub use engine::{AnalysisEngine, AnalysisResult};
pub use error::{AnalysisError, CoreResult};
