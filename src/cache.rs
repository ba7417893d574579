use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scoring::{WeightCandidate, Weights};
use crate::signals::SignalRecord;

/// Get the platform-appropriate cache directory for plugin-score
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("plugin-score/scores"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/plugin-score/scores",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Cached score for one plugin
#[derive(Debug, Serialize, Deserialize)]
struct CachedScore {
    score: f64,
    signals: SignalRecord,
    weights: WeightCandidate,
    cached_at: i64, // Unix timestamp
}

/// Disk cache of final scores keyed by plugin id.
///
/// An entry only counts as a hit while it is younger than the TTL and was
/// computed from the same signals and weights the caller is scoring with now.
#[derive(Debug, Clone)]
pub struct ScoreCache {
    path: PathBuf,
    ttl: Duration,
    enabled: bool,
}

fn cache_key(id: &str) -> String {
    format!("score:{}", id)
}

impl ScoreCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            enabled: true,
        }
    }

    /// A cache that never hits and never writes (--no-cache)
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, id: &str, signals: &SignalRecord, weights: &Weights) -> Option<f64> {
        if !self.enabled {
            return None;
        }
        let bytes = cacache::read_sync(&self.path, cache_key(id)).ok()?;
        let entry: CachedScore = serde_json::from_slice(&bytes).ok()?;

        let age = chrono::Utc::now().timestamp() - entry.cached_at;
        let fresh = age >= 0 && (age as u64) < self.ttl.as_secs();
        if fresh && entry.signals == *signals && entry.weights == weights.to_candidate() {
            Some(entry.score)
        } else {
            None
        }
    }

    pub fn put(
        &self,
        id: &str,
        signals: &SignalRecord,
        weights: &Weights,
        score: f64,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let entry = CachedScore {
            score,
            signals: signals.clone(),
            weights: weights.to_candidate(),
            cached_at: chrono::Utc::now().timestamp(),
        };
        let json = serde_json::to_vec(&entry)?;
        cacache::write_sync(&self.path, cache_key(id), &json)
            .with_context(|| format!("Failed to write score cache for '{}'", id))?;
        Ok(())
    }

    /// Drop every cached score, e.g. after the weights change
    pub fn clear(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove score cache directory"),
        }
    }
}
