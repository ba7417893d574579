use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::io::IsTerminal;

use crate::scoring::{AlgorithmExplanation, CalculationBreakdown, Component, Weights};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a final score with two decimals ("4.38")
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// A plugin with its calculated score for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPlugin<'a> {
    pub id: &'a str,
    pub score: f64,
}

/// Order batch results for display: score descending, then id ascending for ties
pub fn rank_scores(scores: &BTreeMap<String, f64>) -> Vec<ScoredPlugin<'_>> {
    let mut ranked: Vec<_> = scores
        .iter()
        .map(|(id, score)| ScoredPlugin { id, score: *score })
        .collect();
    // BTreeMap iteration is already id-ordered and the sort is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Format plugins as a ranked table with columns: Index, Score, Id
/// Index column: 3 chars (fits "99."), right-aligned
/// Score column: 4 chars ("4.38"), no headers
pub fn format_scored_table(plugins: &[ScoredPlugin], use_colors: bool) -> String {
    if plugins.is_empty() {
        return "No plugins scored.".to_string();
    }

    plugins
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format_score(scored.score);
            if use_colors {
                format!(
                    "{} {}  {}",
                    index_str.dimmed(),
                    score_str.bold(),
                    scored.id.cyan()
                )
            } else {
                format!("{} {}  {}", index_str, score_str, scored.id)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format plugins as tab-separated values for scripting
/// Columns: score, id (no headers, no colors)
pub fn format_tsv(plugins: &[ScoredPlugin]) -> String {
    plugins
        .iter()
        .map(|scored| format!("{}\t{}", format_score(scored.score), scored.id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a calculation breakdown, one line per component followed by the totals
pub fn format_breakdown(breakdown: &CalculationBreakdown, use_colors: bool) -> String {
    let mut lines = Vec::new();

    for c in &breakdown.components {
        let score = match c.score {
            Some(s) => format!("{:.2}", s),
            None => "absent".to_string(),
        };
        let line = format!(
            "  {:<24} {:>6}  weight {:>3}",
            c.component.label(),
            score,
            c.weight
        );
        if use_colors && c.score.is_none() {
            lines.push(line.dimmed().to_string());
        } else {
            lines.push(line);
        }
    }

    lines.push(format!(
        "  Weighted sum: {:.2} / {}",
        breakdown.weighted_sum, breakdown.total_weight
    ));
    lines.push(format!("  Normalized: {:.3}", breakdown.normalized));

    let final_line = format!("  Score: {}", format_score(breakdown.final_score));
    if use_colors {
        lines.push(final_line.bold().to_string());
    } else {
        lines.push(final_line);
    }

    lines.join("\n")
}

/// Format current weights one component per line, plus the total
pub fn format_weights(weights: &Weights, use_colors: bool) -> String {
    let mut lines: Vec<String> = Component::ALL
        .iter()
        .map(|c| {
            let name = format!("{:<24}", c.as_str());
            if use_colors {
                format!("{} {:>3}", name.cyan(), weights.get(*c))
            } else {
                format!("{} {:>3}", name, weights.get(*c))
            }
        })
        .collect();
    lines.push(format!("{:<24} {:>3}", "total", weights.total()));
    lines.join("\n")
}

/// Format the algorithm explanation for terminal reading
pub fn format_explanation(explanation: &AlgorithmExplanation, use_colors: bool) -> String {
    let mut out = String::new();
    if use_colors {
        out.push_str(&explanation.title.bold().to_string());
    } else {
        out.push_str(&explanation.title);
    }
    out.push_str("\n\n");
    out.push_str(&explanation.description);
    out.push_str("\n\n");

    for c in &explanation.components {
        let heading = format!("{} (weight {})", c.label, c.weight);
        if use_colors {
            out.push_str(&heading.cyan().to_string());
        } else {
            out.push_str(&heading);
        }
        out.push_str("\n  ");
        out.push_str(&c.description);
        out.push_str("\n\n");
    }

    out.push_str(&format!(
        "Scale: {:.1} to {:.1}",
        explanation.scale.min, explanation.scale.max
    ));
    out
}
