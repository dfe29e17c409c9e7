//! Pipeline orchestration: the risk path and the causal-chain path over one
//! batch of records.
//!
//! Each stage is a pure function from its inputs to an explicit output
//! record; the orchestrator composes them and owns nothing mutable. The two
//! stages have no data dependency on each other and run concurrently; the
//! only suspension point in either is the reasoning-collaborator call.

pub mod causal;
pub mod risk;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sift_core::config::EngineConfig;
use sift_core::LogRecord;
use sift_detect::PatternLibrary;
use sift_llm::Assessor;

pub use causal::CausalStageOutput;
pub use risk::RiskStageOutput;

/// Combined output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub risk: RiskStageOutput,
    pub causal: CausalStageOutput,
}

/// One engine instance: stateless between runs, safe to reuse across
/// independent batches.
pub struct Pipeline {
    assessor: Box<dyn Assessor>,
    library: PatternLibrary,
    config: EngineConfig,
}

impl Pipeline {
    pub fn new(assessor: Box<dyn Assessor>, config: EngineConfig) -> Self {
        Self {
            assessor,
            library: PatternLibrary::new(),
            config,
        }
    }

    /// Run both analysis paths over a batch of records.
    ///
    /// `known_issues` is pass-through context for the causal path; it is
    /// capped, serialized, and handed to the collaborator untouched.
    pub async fn analyze(&self, records: &[LogRecord], known_issues: &[Value]) -> AnalysisResult {
        let (risk, causal) = tokio::join!(
            risk::run(records, &self.library, self.assessor.as_ref()),
            causal::run(records, known_issues, &self.config, self.assessor.as_ref()),
        );

        AnalysisResult { risk, causal }
    }
}
