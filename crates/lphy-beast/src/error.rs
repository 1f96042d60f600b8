// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use beast_objects::XmlError;
use model_graph::ValueType;

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("unhandled generator #{index} `{kind}` producing `{output}`")]
    UnresolvedGenerator {
        index: usize,
        kind: String,
        output: String,
    },
    #[error("unhandled value `{id}` of type {value_type}")]
    UnresolvedValue { id: String, value_type: ValueType },
    #[error("no BEAST data type for sequence type `{data_type}` of `{id}`")]
    UnresolvedDataType { id: String, data_type: String },
    #[error("cannot coerce `{id}` ({spec}) to {target}")]
    Coercion {
        id: String,
        spec: String,
        target: &'static str,
    },
    #[error("`{translator}` needs a translated `{param}` input")]
    MissingInput { translator: String, param: String },
    #[error("translation context already used; clear it before building another run")]
    StaleContext,
    #[error(transparent)]
    Xml(#[from] XmlError),
}
