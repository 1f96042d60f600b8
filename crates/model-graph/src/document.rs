// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! TOML model documents.
//!
//! A document declares a `data` block and a `model` block, each an ordered list of
//! entries. An entry binds an id to a value and, optionally, to the generator that
//! produced it:
//!
//! ```toml
//! [[model]]
//! id = "lambda"
//! distribution = "LogNormal"
//! params = { meanlog = 3.0, sdlog = 1.0 }
//! value = 20.5
//!
//! [[model]]
//! id = "psi"
//! distribution = "Yule"
//! params = { lambda = "lambda" }
//! value = { newick = "((A:1.0,B:1.0):2.0,C:3.0);" }
//! ```
//!
//! String params reference an earlier id (model block first, then data block); every
//! other param is an anonymous constant. Literal strings are written `{ text = "..." }`.

use crate::graph::{Context, GeneratorCategory, GraphError, ModelGraph, ValueId};
use crate::tree::{NewickError, TimeTree};
use crate::{Alignment, Value};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read model file `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed model document: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("`{id}` references unknown id `{reference}`")]
    UnknownReference { id: String, reference: String },
    #[error("`{0}` declares both a distribution and a function")]
    AmbiguousGenerator(String),
    #[error("`{0}` has params but no generator")]
    ParamsWithoutGenerator(String),
    #[error("invalid tree for `{id}`")]
    Newick {
        id: String,
        #[source]
        source: NewickError,
    },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDocument {
    #[serde(default)]
    data: Vec<Entry>,
    #[serde(default)]
    model: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Entry {
    id: String,
    value: ValueSpec,
    distribution: Option<String>,
    function: Option<String>,
    #[serde(default)]
    params: IndexMap<String, ParamSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParamSpec {
    Reference(String),
    Literal(ValueSpec),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueSpec {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Str(String),
    IntegerArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    BooleanArray(Vec<bool>),
    DoubleMatrix(Vec<Vec<f64>>),
    Tree {
        newick: String,
    },
    Alignment {
        data_type: String,
        sequences: IndexMap<String, String>,
    },
    Text {
        text: String,
    },
}

impl ValueSpec {
    fn into_value(self, id: &str) -> Result<Value, DocumentError> {
        Ok(match self {
            ValueSpec::Integer(x) => Value::Integer(x),
            ValueSpec::Double(x) => Value::Double(x),
            ValueSpec::Boolean(x) => Value::Boolean(x),
            ValueSpec::Str(s) | ValueSpec::Text { text: s } => Value::Str(s),
            ValueSpec::IntegerArray(v) => Value::IntegerArray(v),
            ValueSpec::DoubleArray(v) => Value::DoubleArray(v),
            ValueSpec::BooleanArray(v) => Value::BooleanArray(v),
            ValueSpec::DoubleMatrix(rows) => Value::DoubleMatrix(rows),
            ValueSpec::Tree { newick } => {
                Value::TimeTree(TimeTree::from_newick(&newick).map_err(|source| {
                    DocumentError::Newick {
                        id: id.to_string(),
                        source,
                    }
                })?)
            }
            ValueSpec::Alignment {
                data_type,
                sequences,
            } => Value::Alignment(Alignment::new(data_type, sequences)),
        })
    }
}

impl ModelDocument {
    pub fn from_toml(text: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(text)?)
    }

    pub fn into_graph(self) -> Result<ModelGraph, DocumentError> {
        let mut graph = ModelGraph::new();
        for entry in self.data {
            add_entry(&mut graph, Context::Data, entry)?;
        }
        for entry in self.model {
            add_entry(&mut graph, Context::Model, entry)?;
        }
        Ok(graph)
    }
}

/// Reads and builds the model graph described by a TOML document.
pub fn load_model(path: &Path) -> Result<ModelGraph, DocumentError> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ModelDocument::from_toml(&text)?.into_graph()
}

fn add_entry(graph: &mut ModelGraph, context: Context, entry: Entry) -> Result<(), DocumentError> {
    let Entry {
        id,
        value,
        distribution,
        function,
        params,
    } = entry;

    let generator = match (distribution, function) {
        (Some(_), Some(_)) => return Err(DocumentError::AmbiguousGenerator(id)),
        (Some(kind), None) => Some((kind, GeneratorCategory::Distribution)),
        (None, Some(kind)) => Some((kind, GeneratorCategory::Function)),
        (None, None) => None,
    };

    let value = value.into_value(&id)?;
    match generator {
        None if !params.is_empty() => Err(DocumentError::ParamsWithoutGenerator(id)),
        None => {
            graph.add_value(context, id, value)?;
            Ok(())
        }
        Some((kind, category)) => {
            let mut inputs: Vec<(String, ValueId)> = Vec::with_capacity(params.len());
            for (name, param) in params {
                let input = match param {
                    ParamSpec::Reference(reference) => resolve(graph, context, &reference)
                        .ok_or_else(|| DocumentError::UnknownReference {
                            id: id.clone(),
                            reference,
                        })?,
                    ParamSpec::Literal(literal) => {
                        let literal = literal.into_value(&id)?;
                        graph.constant(context, literal)
                    }
                };
                inputs.push((name, input));
            }
            graph.apply(context, kind.as_str(), category, inputs, id, value)?;
            Ok(())
        }
    }
}

fn resolve(graph: &ModelGraph, context: Context, reference: &str) -> Option<ValueId> {
    match context {
        Context::Model => graph
            .get(reference, Context::Model)
            .or_else(|| graph.get(reference, Context::Data)),
        Context::Data => graph.get(reference, Context::Data),
    }
}
