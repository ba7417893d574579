use serde::Serialize;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, RwLock};
use thiserror::Error;

use super::components::{
    installation_count_score, rating_count_score, support_responsiveness_score,
    user_rating_score,
};
use super::explanation::{explain, AlgorithmExplanation};
use super::validation::{validate_weights, WeightError};
use super::weights::{Component, WeightCandidate, Weights};
use crate::signals::SignalRecord;
use crate::store::{ConfigStore, StoreError};

/// Bottom and top of the output scale
pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// Store key the engine keeps its weights under
pub const WEIGHTS_KEY: &str = "plugin_score_weights";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] WeightError),

    #[error("failed to persist weights")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentScore {
    pub component: Component,
    /// `None` when the underlying signal was missing
    pub score: Option<f64>,
    pub weight: u32,
}

/// Every intermediate value of one calculation, for tracing a score back to its inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationBreakdown {
    pub components: Vec<ComponentScore>,
    pub weights: Weights,
    pub weighted_sum: f64,
    /// Sum of the weights of components that had data
    pub total_weight: u32,
    pub normalized: f64,
    pub final_score: f64,
}

impl CalculationBreakdown {
    pub fn score(&self, component: Component) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.component == component)
            .and_then(|c| c.score)
    }
}

fn component_score(component: Component, record: &SignalRecord) -> Option<f64> {
    match component {
        Component::UserRating => user_rating_score(record.rating),
        Component::RatingCount => rating_count_score(record.num_ratings),
        Component::InstallationCount => installation_count_score(record.active_installs),
        Component::SupportResponsiveness => Some(support_responsiveness_score(
            record.support_threads,
            record.support_threads_resolved,
        )),
    }
}

/// Score one record against a set of weights. Pure; the engine methods wrap this.
pub fn evaluate(record: &SignalRecord, weights: &Weights) -> CalculationBreakdown {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0;
    let mut components = Vec::with_capacity(Component::ALL.len());

    for component in Component::ALL {
        let weight = weights.get(component);
        let score = component_score(component, record);
        if let Some(score) = score {
            weighted_sum += f64::from(weight) * score;
            total_weight += weight;
        }
        components.push(ComponentScore {
            component,
            score,
            weight,
        });
    }

    let (normalized, final_score) = if total_weight == 0 {
        (0.0, MIN_SCORE)
    } else {
        let normalized = weighted_sum / f64::from(total_weight);
        let scaled = MIN_SCORE + normalized * (MAX_SCORE - MIN_SCORE);
        (normalized, scaled.clamp(MIN_SCORE, MAX_SCORE))
    };

    CalculationBreakdown {
        components,
        weights: *weights,
        weighted_sum,
        total_weight,
        normalized,
        final_score,
    }
}

/// Weighted plugin scorer bound to a configuration store.
///
/// Weights sit behind a read-write lock so concurrent scorers never see a
/// half-applied update; updates are written through to the store before they
/// take effect in memory.
pub struct ScoringEngine<S: ConfigStore> {
    store: S,
    weights: RwLock<Weights>,
    last_breakdown: Mutex<Option<CalculationBreakdown>>,
}

impl<S: ConfigStore> ScoringEngine<S> {
    /// Build an engine from whatever weights the store holds.
    ///
    /// A missing entry falls back to the defaults without writing them. A
    /// stored entry that fails validation is ignored the same way.
    pub fn new(store: S) -> Result<Self, StoreError> {
        let weights = match store.read(WEIGHTS_KEY)? {
            None => {
                tracing::debug!("no stored weights, using defaults");
                Weights::default()
            }
            Some(candidate) => match validate_weights(&candidate) {
                Ok(weights) => weights,
                Err(e) => {
                    tracing::warn!(error = %e, "stored weights are invalid, using defaults");
                    Weights::default()
                }
            },
        };
        Ok(Self::with_weights(store, weights))
    }

    /// Build an engine with explicit weights, skipping the store read.
    pub fn with_weights(store: S, weights: Weights) -> Self {
        Self {
            store,
            weights: RwLock::new(weights),
            last_breakdown: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Score one plugin. The breakdown is kept for `last_breakdown`.
    pub fn calculate(&self, record: &SignalRecord) -> f64 {
        let breakdown = self.breakdown(record);
        let score = breakdown.final_score;
        tracing::debug!(
            score,
            weighted_sum = breakdown.weighted_sum,
            total_weight = breakdown.total_weight,
            "calculated score"
        );
        *self
            .last_breakdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(breakdown);
        score
    }

    /// Breakdown of the most recent `calculate` call, if any.
    pub fn last_breakdown(&self) -> Option<CalculationBreakdown> {
        self.last_breakdown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Full breakdown for a record without touching `last_breakdown`.
    pub fn breakdown(&self, record: &SignalRecord) -> CalculationBreakdown {
        evaluate(record, &self.get_weights())
    }

    /// Score many plugins at once, keyed by id.
    ///
    /// All items are scored against one snapshot of the weights. A repeated id
    /// keeps the score of its last occurrence.
    pub fn calculate_batch<I, K, R>(&self, items: I) -> BTreeMap<String, f64>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: Borrow<SignalRecord>,
    {
        let weights = self.get_weights();
        let scores: BTreeMap<String, f64> = items
            .into_iter()
            .map(|(id, record)| (id.into(), evaluate(record.borrow(), &weights).final_score))
            .collect();
        tracing::debug!(count = scores.len(), "calculated batch");
        scores
    }

    /// Copy of the current weights
    pub fn get_weights(&self) -> Weights {
        *self.weights.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and persist new weights, then make them current.
    ///
    /// On any error the current weights are left as they were.
    pub fn update_weights(&self, candidate: &WeightCandidate) -> Result<(), EngineError> {
        let weights = validate_weights(candidate)?;
        self.replace_weights(weights)?;
        tracing::info!(?weights, "weights updated");
        Ok(())
    }

    pub fn reset_weights_to_default(&self) -> Result<(), StoreError> {
        self.replace_weights(Weights::default())?;
        tracing::info!("weights reset to defaults");
        Ok(())
    }

    fn replace_weights(&self, weights: Weights) -> Result<(), StoreError> {
        // Hold the write lock across the store write so writers are serialized
        let mut current = self.weights.write().unwrap_or_else(PoisonError::into_inner);
        self.store.write(WEIGHTS_KEY, &weights)?;
        *current = weights;
        Ok(())
    }

    pub fn get_algorithm_explanation(&self) -> AlgorithmExplanation {
        explain(&self.get_weights())
    }
}
