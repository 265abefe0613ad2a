//! Stage results.

use scenarist_core::{FactsAlgorithm, Stage, TokenUsage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What one stage produced and what it cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage that ran
    pub stage: Stage,
    /// Algorithm, for search and check
    pub algorithm: Option<FactsAlgorithm>,
    /// Artifacts written, in write order
    pub outputs: Vec<PathBuf>,
    /// Tokens spent across all calls
    pub usage: TokenUsage,
    /// Model calls made (resumed work is not counted)
    pub calls: u32,
}

impl StageReport {
    pub(crate) fn new(stage: Stage, algorithm: Option<FactsAlgorithm>) -> Self {
        Self {
            stage,
            algorithm,
            outputs: Vec::new(),
            usage: TokenUsage::default(),
            calls: 0,
        }
    }

    pub(crate) fn record_call(&mut self, usage: TokenUsage) {
        self.usage += usage;
        self.calls += 1;
    }
}
