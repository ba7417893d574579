pub mod components;
pub mod engine;
pub mod explanation;
pub mod validation;
pub mod weights;

pub use engine::{
    evaluate, CalculationBreakdown, ComponentScore, EngineError, ScoringEngine, MAX_SCORE,
    MIN_SCORE, WEIGHTS_KEY,
};
pub use explanation::{AlgorithmExplanation, ComponentExplanation, ScoreScale};
pub use validation::{validate_weights, WeightError};
pub use weights::{Component, WeightCandidate, Weights};
