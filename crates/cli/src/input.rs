//! JSON input decoding for the subcommands.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use adpulse_core::DailyMetric;

/// Read a whole input file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn parse_input<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON input in {}", path.display()))
}

/// Either a single object or an array of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// One creative's daily history for the `fatigue` command.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub creative_age_days: u32,
    pub daily_metrics: Vec<DailyMetric>,
}
