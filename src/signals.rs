use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Raw catalog signals for one plugin.
///
/// Every field is optional. Zero and missing are treated the same by the
/// scoring functions, and out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SignalRecord {
    /// Average end-user rating, 0-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ratings: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_installs: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_threads: Option<i64>,

    /// Should not exceed `support_threads`; excess is clamped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_threads_resolved: Option<i64>,
}

/// Read input from a file, or stdin when the path is `-`
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read signals from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read signals file at {}", path.display()))
    }
}

/// Load a single signal record from a JSON object
pub fn load_signals(path: &Path) -> Result<SignalRecord> {
    let content = read_input(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse signals: invalid JSON in {}", path.display()))
}

/// Load a batch of signal records from a JSON object keyed by item id
pub fn load_batch(path: &Path) -> Result<BTreeMap<String, SignalRecord>> {
    let content = read_input(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse batch: invalid JSON in {}", path.display()))
}
