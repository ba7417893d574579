/// One bucket of a stepped score: values strictly below `below` score `score`.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub below: u64,
    pub score: f64,
}

/// Ordered threshold table mapping a count onto a score.
///
/// Steps are checked in order and the first one whose bound the value falls
/// under wins; anything at or above the last bound gets `ceiling`.
#[derive(Debug, Clone, Copy)]
pub struct StepTable {
    pub steps: &'static [Step],
    pub ceiling: f64,
}

impl StepTable {
    pub fn lookup(&self, value: u64) -> f64 {
        self.steps
            .iter()
            .find(|step| value < step.below)
            .map(|step| step.score)
            .unwrap_or(self.ceiling)
    }
}

pub const RATING_COUNT_STEPS: StepTable = StepTable {
    steps: &[
        Step { below: 10, score: 0.4 },
        Step { below: 100, score: 0.6 },
        Step { below: 1_000, score: 0.8 },
    ],
    ceiling: 1.0,
};

pub const INSTALLATION_STEPS: StepTable = StepTable {
    steps: &[
        Step { below: 100, score: 0.2 },
        Step { below: 1_000, score: 0.3 },
        Step { below: 10_000, score: 0.5 },
        Step { below: 100_000, score: 0.7 },
        Step { below: 1_000_000, score: 0.9 },
    ],
    ceiling: 1.0,
};

/// Rating scale upper bound (ratings are 0-5 stars)
pub const MAX_RATING: f64 = 5.0;

/// Support score when a plugin has no support threads at all
pub const NEUTRAL_SUPPORT_SCORE: f64 = 0.5;

/// Bonus added to the resolution rate before capping at 1.0
pub const SUPPORT_RESOLUTION_BONUS: f64 = 0.1;

/// Clamp a raw count to zero-or-more. Negative counts mean "no data".
fn count(raw: Option<i64>) -> u64 {
    raw.map(|n| n.max(0) as u64).unwrap_or(0)
}

/// Average user rating scaled into [0, 1]. `None` when unrated.
pub fn user_rating_score(rating: Option<f64>) -> Option<f64> {
    let rating = rating?;
    if rating.is_nan() || rating <= 0.0 {
        return None;
    }
    Some(rating.min(MAX_RATING) / MAX_RATING)
}

/// Stepped score for the number of ratings. `None` when there are none.
pub fn rating_count_score(num_ratings: Option<i64>) -> Option<f64> {
    match count(num_ratings) {
        0 => None,
        n => Some(RATING_COUNT_STEPS.lookup(n)),
    }
}

/// Stepped score for active installs. `None` when there are none.
pub fn installation_count_score(active_installs: Option<i64>) -> Option<f64> {
    match count(active_installs) {
        0 => None,
        n => Some(INSTALLATION_STEPS.lookup(n)),
    }
}

/// Support responsiveness from the resolved-thread ratio.
///
/// Never absent: with no support threads the plugin gets the neutral score.
pub fn support_responsiveness_score(threads: Option<i64>, resolved: Option<i64>) -> f64 {
    let threads = count(threads);
    if threads == 0 {
        return NEUTRAL_SUPPORT_SCORE;
    }
    let resolved = count(resolved).min(threads);
    let rate = resolved as f64 / threads as f64;
    (rate + SUPPORT_RESOLUTION_BONUS).min(1.0)
}
