use serde::Serialize;

use super::engine::{MAX_SCORE, MIN_SCORE};
use super::weights::{Component, Weights};

/// Human-facing description of how scores are computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmExplanation {
    pub title: String,
    pub description: String,
    pub components: Vec<ComponentExplanation>,
    pub scale: ScoreScale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentExplanation {
    pub component: Component,
    pub label: String,
    pub description: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreScale {
    pub min: f64,
    pub max: f64,
}

fn component_description(component: Component) -> &'static str {
    match component {
        Component::UserRating => {
            "Average star rating from users, scaled from 0-5 stars. Left out when the plugin has no ratings."
        }
        Component::RatingCount => {
            "How many users rated the plugin. More ratings make the average more trustworthy: \
             under 10 scores 0.4, under 100 scores 0.6, under 1,000 scores 0.8, and 1,000 or more scores 1.0."
        }
        Component::InstallationCount => {
            "Active installations as a measure of adoption: under 100 scores 0.2, under 1,000 scores 0.3, \
             under 10,000 scores 0.5, under 100,000 scores 0.7, under 1,000,000 scores 0.9, and 1,000,000 or more scores 1.0."
        }
        Component::SupportResponsiveness => {
            "Share of support threads marked resolved, plus a 0.1 bonus, capped at 1.0. \
             Plugins without support threads get a neutral 0.5 instead of being left out."
        }
    }
}

pub(crate) fn explain(weights: &Weights) -> AlgorithmExplanation {
    AlgorithmExplanation {
        title: "Plugin Quality Score".to_string(),
        description: "Each plugin gets a score from 1.0 to 5.0 built from a weighted average of \
                      component scores. Components without data are left out and the remaining \
                      weights are rescaled, so missing signals do not drag a plugin down. A plugin \
                      with no data at all scores 1.0."
            .to_string(),
        components: Component::ALL
            .iter()
            .map(|c| ComponentExplanation {
                component: *c,
                label: c.label().to_string(),
                description: component_description(*c).to_string(),
                weight: weights.get(*c),
            })
            .collect(),
        scale: ScoreScale {
            min: MIN_SCORE,
            max: MAX_SCORE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explanation_lists_every_component_with_weight() {
        let explanation = explain(&Weights::default());
        assert_eq!(explanation.components.len(), 4);
        assert_eq!(explanation.components[0].component, Component::UserRating);
        assert_eq!(explanation.components[0].weight, 40);
        assert_eq!(explanation.components[3].label, "Support Responsiveness");
        assert_eq!(explanation.components[3].weight, 15);
    }

    #[test]
    fn test_explanation_scale() {
        let explanation = explain(&Weights::default());
        assert_eq!(explanation.scale, ScoreScale { min: 1.0, max: 5.0 });
    }

    #[test]
    fn test_explanation_serializes() {
        let json = serde_json::to_value(explain(&Weights::default())).unwrap();
        assert_eq!(json["components"][1]["component"], "rating_count");
        assert_eq!(json["scale"]["max"], 5.0);
    }
}
