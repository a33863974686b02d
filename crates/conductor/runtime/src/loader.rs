//! Contract Loader
//!
//! Discovers contract documents on durable storage and parses them into
//! raw form. Cross-reference validation is the registry phase's job;
//! the loader only guarantees that documents handed onward are
//! well-formed.

use std::fs;
use std::path::{Path, PathBuf};

use conductor_contract::RawContract;
use tracing::{debug, info};

use crate::errors::LoadError;

/// A discovered, parsed, not-yet-validated contract document.
#[derive(Clone, Debug)]
pub struct ContractSource {
    pub path: PathBuf,
    pub raw: RawContract,
}

/// Discovers and parses contract documents from a directory.
#[derive(Clone, Debug)]
pub struct ContractLoader {
    dir: PathBuf,
}

impl ContractLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Discover every `*.yaml` / `*.yml` document under the contract
    /// directory, in path order, and parse each into raw form.
    pub fn discover(&self) -> Result<Vec<ContractSource>, LoadError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| LoadError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                )
            })
            .collect();
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            let raw: RawContract =
                serde_yaml::from_str(&text).map_err(|e| LoadError::Parse {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            debug!(path = %path.display(), "Parsed contract document");
            sources.push(ContractSource { path, raw });
        }

        info!(
            dir = %self.dir.display(),
            count = sources.len(),
            "Contract discovery complete"
        );
        Ok(sources)
    }
}
