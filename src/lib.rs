pub mod alerts;
pub mod config;
pub mod detection;
pub mod error;
pub mod export;
pub mod generator;
pub mod ingest;
pub mod latency;
pub mod stress;
pub mod types;
pub mod views;

pub use config::{AnalyzerConfig, ScoreWeights, Thresholds};
pub use detection::analyze;
pub use error::{AnalyzerError, Result};
pub use types::{AnalyzedTrade, Analysis, Direction, Summary, TradeRecord};
