//! Core [`RuleLoader`] struct: filesystem-backed rule loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{info, warn};

use adpulse_core::{BenchmarkProvider, IndustryBenchmarks};

use crate::schema::{RuleDocument, RuleEnvelope};
use crate::thresholds::AnomalyThresholds;

use super::error::{LoadResult, LoadStatus, Result, RuleError};

/// Filesystem-backed rule loader.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files and keeps
/// the parsed documents in memory keyed by rule ID. When several enabled
/// documents of one kind exist, the one with the lowest ID wins.
pub struct RuleLoader {
    /// Root directory containing rule YAML files.
    rules_dir: PathBuf,
    /// All rule documents keyed by `metadata.id`.
    documents: RwLock<BTreeMap<String, RuleDocument>>,
}

impl RuleLoader {
    /// Create a new loader for the given directory. Nothing is read until
    /// [`load_all`](Self::load_all) is called.
    pub fn new(rules_dir: PathBuf) -> Self {
        Self {
            rules_dir,
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    /// Recursively scan the rules directory and load all YAML files.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse errors are reported
    /// per-file but do not abort the scan. A missing directory yields an
    /// empty result (all lookups then return defaults).
    pub fn load_all(&self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        if !self.rules_dir.exists() {
            warn!(path = %self.rules_dir.display(), "rules directory does not exist, using defaults");
            return Ok(results);
        }
        self.scan_dir_recursive(&self.rules_dir, &mut results)?;
        Ok(results)
    }

    /// Recursively scan a directory for YAML rule files.
    fn scan_dir_recursive(&self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        paths.sort();

        for path in paths {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);

            if !is_yaml {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let status = match self.load_file(&path).and_then(|doc| self.insert_document(doc)) {
                Ok(rule_id) => {
                    info!(rule_id = %rule_id, path = %path.display(), "loaded rule");
                    LoadStatus::Loaded { rule_id }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(LoadResult { path, status });
        }

        Ok(())
    }

    /// Parse a single YAML file into a [`RuleDocument`] via two-pass deserialization.
    pub fn load_file(&self, path: &Path) -> Result<RuleDocument> {
        let contents = fs::read_to_string(path)?;

        let envelope: RuleEnvelope = serde_yaml::from_str(&contents)?;

        if envelope.metadata.id.is_empty() {
            return Err(RuleError::Validation(
                "rule metadata.id must not be empty".to_string(),
            ));
        }

        let doc = envelope.parse_full().map_err(|e| {
            RuleError::Validation(format!(
                "failed to parse rule '{}': {}",
                envelope.metadata.id, e
            ))
        })?;

        if let RuleDocument::IndustryBenchmarks(rule) = &doc {
            let degenerate = rule.compile().degenerate_fields();
            if !degenerate.is_empty() {
                warn!(
                    rule_id = %rule.metadata.id,
                    fields = ?degenerate,
                    "benchmark values are not positive; affected metrics will score neutral"
                );
            }
        }

        Ok(doc)
    }

    /// Insert a document, rejecting duplicate IDs.
    fn insert_document(&self, doc: RuleDocument) -> Result<String> {
        let id = doc.metadata().id.clone();
        let mut documents = self.documents.write().expect("documents lock poisoned");
        if documents.contains_key(&id) {
            return Err(RuleError::Validation(format!("duplicate rule id '{}'", id)));
        }
        documents.insert(id.clone(), doc);
        Ok(id)
    }

    /// Get the rules directory path.
    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Snapshot of all loaded documents, ordered by ID.
    pub fn documents(&self) -> Vec<RuleDocument> {
        self.documents
            .read()
            .expect("documents lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Effective anomaly thresholds: the first enabled `AnomalyThresholds`
    /// document, or the built-in defaults.
    pub fn thresholds(&self) -> AnomalyThresholds {
        self.documents
            .read()
            .expect("documents lock poisoned")
            .values()
            .filter_map(RuleDocument::as_anomaly_thresholds)
            .find(|rule| rule.metadata.enabled)
            .map(|rule| rule.compile())
            .unwrap_or_default()
    }
}

impl BenchmarkProvider for RuleLoader {
    /// The first enabled `IndustryBenchmarks` document, or the built-in defaults.
    fn benchmarks(&self) -> IndustryBenchmarks {
        self.documents
            .read()
            .expect("documents lock poisoned")
            .values()
            .filter_map(RuleDocument::as_industry_benchmarks)
            .find(|rule| rule.metadata.enabled)
            .map(|rule| rule.compile())
            .unwrap_or_default()
    }
}
