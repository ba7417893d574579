use thiserror::Error;

use super::weights::{Component, WeightCandidate, Weights};

/// Lowest and highest weight a single component may carry.
pub const MIN_WEIGHT: i64 = 0;
pub const MAX_WEIGHT: i64 = 100;

/// Weights must add up to exactly this.
pub const REQUIRED_TOTAL: i64 = 100;

/// Why a weight candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightError {
    #[error("missing weight for component '{0}'")]
    MissingComponent(Component),

    #[error("weight for '{component}' must be between 0 and 100, got {value}")]
    InvalidRange { component: Component, value: i64 },

    #[error("weights must sum to 100, got {0}")]
    InvalidTotal(i64),
}

impl WeightError {
    /// Stable machine-readable code for callers that relay errors over a wire.
    pub fn kind(&self) -> &'static str {
        match self {
            WeightError::MissingComponent(_) => "missing_component",
            WeightError::InvalidRange { .. } => "invalid_range",
            WeightError::InvalidTotal(_) => "invalid_total",
        }
    }
}

/// Validate a weight candidate and turn it into `Weights`.
///
/// Checks run in a fixed order and stop at the first failure: every component
/// must be present, then each must be in range, then the total must be 100.
/// Keys that are not component names are ignored.
pub fn validate_weights(candidate: &WeightCandidate) -> Result<Weights, WeightError> {
    let mut values = [0i64; 4];
    for (slot, component) in values.iter_mut().zip(Component::ALL) {
        *slot = *candidate
            .get(component.as_str())
            .ok_or(WeightError::MissingComponent(component))?;
    }

    for (value, component) in values.iter().zip(Component::ALL) {
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(value) {
            return Err(WeightError::InvalidRange {
                component,
                value: *value,
            });
        }
    }

    // In-range values cannot overflow here
    let total: i64 = values.iter().sum();
    if total != REQUIRED_TOTAL {
        return Err(WeightError::InvalidTotal(total));
    }

    let [user_rating, rating_count, installation_count, support_responsiveness] =
        values.map(|v| v as u32);
    Ok(Weights {
        user_rating,
        rating_count,
        installation_count,
        support_responsiveness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(pairs: &[(&str, i64)]) -> WeightCandidate {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_valid_weights() {
        let weights = validate_weights(&candidate(&[
            ("user_rating", 25),
            ("rating_count", 25),
            ("installation_count", 25),
            ("support_responsiveness", 25),
        ]))
        .unwrap();
        assert_eq!(weights.get(Component::RatingCount), 25);
        assert_eq!(weights.total(), 100);
    }

    #[test]
    fn test_zero_weight_is_allowed() {
        let weights = validate_weights(&candidate(&[
            ("user_rating", 100),
            ("rating_count", 0),
            ("installation_count", 0),
            ("support_responsiveness", 0),
        ]))
        .unwrap();
        assert_eq!(weights.get(Component::UserRating), 100);
    }

    #[test]
    fn test_default_weights_round_trip_through_validation() {
        let weights = validate_weights(&Weights::default().to_candidate()).unwrap();
        assert_eq!(weights, Weights::default());
    }

    #[test]
    fn test_missing_component() {
        let err = validate_weights(&candidate(&[
            ("user_rating", 40),
            ("rating_count", 20),
            ("installation_count", 40),
        ]))
        .unwrap_err();
        assert_eq!(err, WeightError::MissingComponent(Component::SupportResponsiveness));
        assert_eq!(err.kind(), "missing_component");
    }

    #[test]
    fn test_negative_weight_is_invalid_range() {
        let err = validate_weights(&candidate(&[
            ("user_rating", -10),
            ("rating_count", 30),
            ("installation_count", 40),
            ("support_responsiveness", 40),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            WeightError::InvalidRange {
                component: Component::UserRating,
                value: -10
            }
        );
        assert_eq!(err.kind(), "invalid_range");
    }

    #[test]
    fn test_weight_above_100_is_invalid_range() {
        let err = validate_weights(&candidate(&[
            ("user_rating", 0),
            ("rating_count", 0),
            ("installation_count", 150),
            ("support_responsiveness", 0),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_range");
    }

    #[test]
    fn test_wrong_total() {
        let err = validate_weights(&candidate(&[
            ("user_rating", 50),
            ("rating_count", 30),
            ("installation_count", 30),
            ("support_responsiveness", 10),
        ]))
        .unwrap_err();
        assert_eq!(err, WeightError::InvalidTotal(120));
        assert_eq!(err.kind(), "invalid_total");
    }

    #[test]
    fn test_presence_checked_before_range() {
        let err = validate_weights(&candidate(&[
            ("user_rating", -1),
            ("rating_count", 500),
            ("installation_count", 0),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), "missing_component");
    }

    #[test]
    fn test_range_checked_before_total() {
        let err = validate_weights(&candidate(&[
            ("user_rating", 101),
            ("rating_count", 0),
            ("installation_count", 0),
            ("support_responsiveness", 0),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_range");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut c = Weights::default().to_candidate();
        c.insert("popularity".to_string(), 999);
        assert!(validate_weights(&c).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            WeightError::InvalidTotal(120).to_string(),
            "weights must sum to 100, got 120"
        );
        assert_eq!(
            WeightError::MissingComponent(Component::RatingCount).to_string(),
            "missing weight for component 'rating_count'"
        );
    }
}
