// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::{Alignment, TimeTree};
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::Hash;

/// A stable type tag used to index translators.
///
/// Tags form a hierarchy: a tag is assignable from itself and from any of its
/// specialisations, which lets a registry fall back to the nearest registered supertype.
pub trait TypeTag: Clone + Eq + Hash + Debug + Display {
    fn is_assignable_from(&self, other: &Self) -> bool;
}

/// Runtime value held by a value node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Double(f64),
    Integer(i64),
    Boolean(bool),
    Str(String),
    DoubleArray(Vec<f64>),
    IntegerArray(Vec<i64>),
    BooleanArray(Vec<bool>),
    /// Row-major matrix, e.g. an instantaneous rate matrix.
    DoubleMatrix(Vec<Vec<f64>>),
    TimeTree(TimeTree),
    Alignment(Alignment),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Double(_) => ValueType::Double,
            Value::Integer(_) => ValueType::Integer,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Str(_) => ValueType::Str,
            Value::DoubleArray(_) => ValueType::DoubleArray,
            Value::IntegerArray(_) => ValueType::IntegerArray,
            Value::BooleanArray(_) => ValueType::BooleanArray,
            Value::DoubleMatrix(_) => ValueType::DoubleMatrix,
            Value::TimeTree(_) => ValueType::TimeTree,
            Value::Alignment(_) => ValueType::Alignment,
        }
    }

    /// Number of scalar components; trees and alignments count as one.
    pub fn dimension(&self) -> usize {
        match self {
            Value::DoubleArray(v) => v.len(),
            Value::IntegerArray(v) => v.len(),
            Value::BooleanArray(v) => v.len(),
            Value::DoubleMatrix(rows) => rows.iter().map(Vec::len).sum(),
            _ => 1,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(x) => Some(*x),
            Value::Integer(x) => Some(*x as f64),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Double(x) => write!(f, "{:?}", x),
            Value::Integer(x) => write!(f, "{}", x),
            Value::Boolean(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::DoubleArray(v) => write!(f, "{:?}", v),
            Value::IntegerArray(v) => write!(f, "{:?}", v),
            Value::BooleanArray(v) => write!(f, "{:?}", v),
            Value::DoubleMatrix(rows) => write!(f, "{:?}", rows),
            Value::TimeTree(tree) => write!(f, "{}", tree.to_newick()),
            Value::Alignment(alignment) => write!(
                f,
                "alignment({} taxa, {} sites)",
                alignment.taxa_count(),
                alignment.site_count()
            ),
        }
    }
}

/// Type tags for runtime values. `Number` and `NumberArray` are abstract: no value
/// carries them directly, but translators may be registered against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Number,
    Double,
    Integer,
    Boolean,
    Str,
    NumberArray,
    DoubleArray,
    IntegerArray,
    BooleanArray,
    DoubleMatrix,
    TimeTree,
    Alignment,
}

impl ValueType {
    pub fn supertype(self) -> Option<ValueType> {
        match self {
            ValueType::Double | ValueType::Integer => Some(ValueType::Number),
            ValueType::DoubleArray | ValueType::IntegerArray => Some(ValueType::NumberArray),
            _ => None,
        }
    }
}

impl TypeTag for ValueType {
    fn is_assignable_from(&self, other: &Self) -> bool {
        let mut current = Some(*other);
        while let Some(ty) = current {
            if ty == *self {
                return true;
            }
            current = ty.supertype();
        }
        false
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Number => "Number",
            ValueType::Double => "Double",
            ValueType::Integer => "Integer",
            ValueType::Boolean => "Boolean",
            ValueType::Str => "String",
            ValueType::NumberArray => "Number[]",
            ValueType::DoubleArray => "Double[]",
            ValueType::IntegerArray => "Integer[]",
            ValueType::BooleanArray => "Boolean[]",
            ValueType::DoubleMatrix => "Double[][]",
            ValueType::TimeTree => "TimeTree",
            ValueType::Alignment => "Alignment",
        };
        f.write_str(name)
    }
}
