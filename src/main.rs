use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use plugin_score::cache::{get_cache_path, ScoreCache};
use plugin_score::config::Config;
use plugin_score::output;
use plugin_score::scoring::{EngineError, ScoringEngine, WeightCandidate};
use plugin_score::store::FileStore;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_VALIDATION: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a single plugin from a JSON signal file ("-" for stdin)
    Score {
        file: PathBuf,
        /// Show per-component scores and intermediate totals
        #[arg(short, long)]
        breakdown: bool,
        #[arg(long)]
        json: bool,
    },
    /// Score many plugins from a JSON object keyed by plugin id
    Batch {
        file: PathBuf,
        #[arg(long, conflicts_with = "tsv")]
        json: bool,
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
        /// Ignore and don't update the score cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Show or change the component weights
    #[command(subcommand)]
    Weights(WeightsCommand),
    /// Describe how scores are calculated
    Explain {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum WeightsCommand {
    /// Print the current weights
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Replace all four weights (must sum to 100)
    Set(SetWeights),
    /// Restore the default weights
    Reset,
}

#[derive(Args, Debug)]
struct SetWeights {
    #[arg(long, allow_negative_numbers = true)]
    user_rating: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    rating_count: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    installation_count: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    support_responsiveness: Option<i64>,
}

impl SetWeights {
    /// Only flags that were given end up in the candidate, so a missing
    /// flag is reported as a missing component.
    fn to_candidate(&self) -> WeightCandidate {
        [
            ("user_rating", self.user_rating),
            ("rating_count", self.rating_count),
            ("installation_count", self.installation_count),
            ("support_responsiveness", self.support_responsiveness),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
    }
}

#[derive(Parser, Debug)]
#[command(name = "plugin-score")]
#[command(about = "Explainable 1.0-5.0 plugin quality scores", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/plugin-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn build_cache(config: &Config, no_cache: bool) -> ScoreCache {
    if no_cache || !config.cache.enabled {
        return ScoreCache::disabled();
    }
    // validate_config has already checked the ttl
    let ttl = config.cache.ttl().unwrap_or_default();
    let path = config.cache.path.clone().unwrap_or_else(get_cache_path);
    ScoreCache::new(path, ttl)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match plugin_score::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = plugin_score::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    plugin_score::logging::init_subscriber(cli.verbose, config.log_level.as_deref());

    let store = FileStore::new(config.weights_path());
    tracing::debug!(path = %store.path().display(), "using weight store");
    let engine = match ScoringEngine::new(store) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Weight store error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = output::should_use_colors();

    match cli.command {
        Commands::Score {
            file,
            breakdown,
            json,
        } => {
            let record = match plugin_score::signals::load_signals(&file) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            let score = engine.calculate(&record);
            let details = engine.last_breakdown();

            match (json, breakdown, details) {
                (true, true, Some(details)) => print_json(&details),
                (true, _, _) => print_json(&serde_json::json!({ "score": score })),
                (false, true, Some(details)) => {
                    println!("{}", output::format_breakdown(&details, use_colors))
                }
                (false, _, _) => println!("{}", output::format_score(score)),
            }
        }
        Commands::Batch {
            file,
            json,
            tsv,
            no_cache,
        } => {
            let batch = match plugin_score::signals::load_batch(&file) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            let cache = build_cache(&config, no_cache);
            let weights = engine.get_weights();

            let (cached, misses): (Vec<_>, Vec<_>) = batch
                .iter()
                .map(|(id, record)| (id, record, cache.get(id, record, &weights)))
                .partition(|(_, _, hit)| hit.is_some());
            tracing::debug!(hits = cached.len(), misses = misses.len(), "score cache lookup");

            let mut scores = engine.calculate_batch(misses.iter().map(|(id, r, _)| (id.as_str(), *r)));
            for (id, record, _) in &misses {
                let score = scores[id.as_str()];
                if let Err(e) = cache.put(id, record, &weights, score) {
                    tracing::warn!(error = %format!("{:#}", e), "failed to cache score");
                }
            }
            scores.extend(
                cached
                    .into_iter()
                    .filter_map(|(id, _, hit)| hit.map(|s| (id.clone(), s))),
            );

            let ranked = output::rank_scores(&scores);
            if json {
                print_json(&scores);
            } else if tsv {
                println!("{}", output::format_tsv(&ranked));
            } else {
                println!("{}", output::format_scored_table(&ranked, use_colors));
            }
        }
        Commands::Weights(WeightsCommand::Show { json }) => {
            let weights = engine.get_weights();
            if json {
                print_json(&weights);
            } else {
                println!("{}", output::format_weights(&weights, use_colors));
            }
        }
        Commands::Weights(WeightsCommand::Set(args)) => {
            match engine.update_weights(&args.to_candidate()) {
                Ok(()) => {}
                Err(EngineError::Validation(e)) => {
                    eprintln!("Invalid weights ({}): {}", e.kind(), e);
                    std::process::exit(EXIT_VALIDATION);
                }
                Err(EngineError::Persistence(e)) => {
                    eprintln!("Failed to save weights: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
            clear_cache(&config);
            println!("{}", output::format_weights(&engine.get_weights(), use_colors));
        }
        Commands::Weights(WeightsCommand::Reset) => {
            if let Err(e) = engine.reset_weights_to_default() {
                eprintln!("Failed to save weights: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
            clear_cache(&config);
            println!("{}", output::format_weights(&engine.get_weights(), use_colors));
        }
        Commands::Explain { json } => {
            let explanation = engine.get_algorithm_explanation();
            if json {
                print_json(&explanation);
            } else {
                println!("{}", output::format_explanation(&explanation, use_colors));
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Cached scores were computed under the old weights
fn clear_cache(config: &Config) {
    if let Err(e) = build_cache(config, false).clear() {
        tracing::warn!(error = %format!("{:#}", e), "failed to clear score cache");
    }
}
