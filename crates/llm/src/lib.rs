pub mod normalize;
pub mod provider;
pub mod providers;

pub use normalize::{
    CausalChain, ChainEvent, Confidence, Normalized, RiskLevel, RiskPrediction, TimeHorizon,
};
pub use provider::{AssessError, Assessor, Message, Role};
pub use providers::create_assessor;
