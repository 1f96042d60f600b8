// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;

/// A multiple sequence alignment keyed by taxon name.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    data_type: String,
    sequences: IndexMap<String, String>,
}

impl Alignment {
    pub fn new(data_type: impl Into<String>, sequences: IndexMap<String, String>) -> Self {
        Self {
            data_type: data_type.into(),
            sequences,
        }
    }

    /// e.g. `nucleotide`, `aminoacid`, `binary`.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn sequences(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sequences.iter().map(|(t, s)| (t.as_str(), s.as_str()))
    }

    pub fn taxa(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    pub fn taxa_count(&self) -> usize {
        self.sequences.len()
    }

    pub fn site_count(&self) -> usize {
        self.sequences
            .values()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0)
    }
}
