use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Untrusted weight mapping as handed in by a caller or read back from a store.
///
/// Keys are component names; values may be anything an integer can hold and
/// are only trusted after `validate_weights`.
pub type WeightCandidate = BTreeMap<String, i64>;

/// One of the four signals that contribute to a plugin's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    UserRating,
    RatingCount,
    InstallationCount,
    SupportResponsiveness,
}

impl Component {
    /// All components in evaluation (and validation) order.
    pub const ALL: [Component; 4] = [
        Component::UserRating,
        Component::RatingCount,
        Component::InstallationCount,
        Component::SupportResponsiveness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::UserRating => "user_rating",
            Component::RatingCount => "rating_count",
            Component::InstallationCount => "installation_count",
            Component::SupportResponsiveness => "support_responsiveness",
        }
    }

    /// Human-facing label, e.g. for tables and the algorithm explanation
    pub fn label(&self) -> &'static str {
        match self {
            Component::UserRating => "User Rating",
            Component::RatingCount => "Rating Count",
            Component::InstallationCount => "Active Installations",
            Component::SupportResponsiveness => "Support Responsiveness",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated weight configuration.
///
/// Each weight is in `0..=100` and the four always sum to exactly 100. The only
/// ways to obtain one are `Default` and `validate_weights`, so holding a
/// `Weights` is proof of validity.
///
/// Example YAML/JSON shape:
/// ```yaml
/// user_rating: 40
/// rating_count: 20
/// installation_count: 25
/// support_responsiveness: 15
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Weights {
    pub(crate) user_rating: u32,
    pub(crate) rating_count: u32,
    pub(crate) installation_count: u32,
    pub(crate) support_responsiveness: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            user_rating: 40,
            rating_count: 20,
            installation_count: 25,
            support_responsiveness: 15,
        }
    }
}

impl Weights {
    pub fn get(&self, component: Component) -> u32 {
        match component {
            Component::UserRating => self.user_rating,
            Component::RatingCount => self.rating_count,
            Component::InstallationCount => self.installation_count,
            Component::SupportResponsiveness => self.support_responsiveness,
        }
    }

    pub fn total(&self) -> u32 {
        Component::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Back to the untyped mapping shape used by stores and `update_weights`.
    pub fn to_candidate(&self) -> WeightCandidate {
        Component::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), i64::from(self.get(*c))))
            .collect()
    }
}
