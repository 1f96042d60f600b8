// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Nodes tolerated without a translator.

use crate::options::Options;
use model_graph::{GeneratorKind, TypeTag, Value, ValueType};

/// Strings, e.g. file names passed to a data loader, never reach the target engine.
pub fn is_excluded_value(value: &Value) -> bool {
    value.value_type() == ValueType::Str
}

/// Generators listed in [`Options::excluded_generators`], including their specialisations.
pub fn is_excluded_generator(kind: &GeneratorKind, options: &Options) -> bool {
    options
        .excluded_generators
        .iter()
        .any(|excluded| GeneratorKind::new(excluded.as_str()).is_assignable_from(kind))
}
