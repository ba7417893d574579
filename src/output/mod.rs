pub mod formatter;

pub use formatter::{
    format_breakdown, format_explanation, format_score, format_scored_table, format_tsv,
    format_weights, rank_scores, should_use_colors, ScoredPlugin,
};
