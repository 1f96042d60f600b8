// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options of one translation. Most are configured via a toml file; some over command
/// line flags, which take precedence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Number of MCMC steps written to the run.
    pub chain_length: u64,
    /// Sampling interval of every logger.
    pub log_every: u64,
    /// Verbosity level for logging.
    pub verbosity_level: LevelFilter,
    /// Generator kinds tolerated without a translator.
    pub excluded_generators: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            chain_length: 1_000_000,
            log_every: 1000,
            verbosity_level: LevelFilter::Info,
            excluded_generators: vec![
                "ntaxa".to_string(),
                "nexus".to_string(),
                "dataframe".to_string(),
            ],
        }
    }
}

impl Options {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config `{}`", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config `{}`", path.display()))
    }
}
