// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// Handle of an object in a [`crate::BeastGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A scalar input value, written as an XML attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Text(String),
    Real(f64),
    Int(i64),
    Bool(bool),
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Text(s) => f.write_str(s),
            Primitive::Real(x) => write!(f, "{:?}", x),
            Primitive::Int(x) => write!(f, "{}", x),
            Primitive::Bool(x) => write!(f, "{}", x),
        }
    }
}

/// A named input of an object: either a scalar or references to other objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Value(Primitive),
    Object(ObjectId),
    Objects(Vec<ObjectId>),
}

impl From<ObjectId> for Input {
    fn from(id: ObjectId) -> Self {
        Input::Object(id)
    }
}

impl From<Vec<ObjectId>> for Input {
    fn from(ids: Vec<ObjectId>) -> Self {
        Input::Objects(ids)
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Value(Primitive::Text(s.to_string()))
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Value(Primitive::Text(s))
    }
}

impl From<f64> for Input {
    fn from(x: f64) -> Self {
        Input::Value(Primitive::Real(x))
    }
}

impl From<i64> for Input {
    fn from(x: i64) -> Self {
        Input::Value(Primitive::Int(x))
    }
}

impl From<u64> for Input {
    fn from(x: u64) -> Self {
        Input::Value(Primitive::Int(x as i64))
    }
}

impl From<bool> for Input {
    fn from(x: bool) -> Self {
        Input::Value(Primitive::Bool(x))
    }
}

/// Values and bounds of a BEAST parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter<T> {
    pub values: Vec<T>,
    pub lower: Option<T>,
    pub upper: Option<T>,
    /// Column count when the parameter holds a flattened matrix.
    pub minor_dimension: Option<usize>,
    pub keys: Option<Vec<String>>,
}

impl<T: Copy + PartialOrd> Parameter<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self {
            values,
            lower: None,
            upper: None,
            minor_dimension: None,
            keys: None,
        }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Raises the lower bound to `bound` unless it is already tighter.
    pub fn tighten_lower(&mut self, bound: T) {
        match self.lower {
            Some(lower) if lower >= bound => {}
            _ => self.lower = Some(bound),
        }
    }

    /// Lowers the upper bound to `bound` unless it is already tighter.
    pub fn tighten_upper(&mut self, bound: T) {
        match self.upper {
            Some(upper) if upper <= bound => {}
            _ => self.upper = Some(bound),
        }
    }
}

impl<T: fmt::Debug> Parameter<T> {
    pub(crate) fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attributes = vec![("dimension", self.values.len().to_string())];
        if let Some(minor) = self.minor_dimension {
            attributes.push(("minordimension", minor.to_string()));
        }
        if let Some(keys) = &self.keys {
            attributes.push(("keys", keys.join(" ")));
        }
        if let Some(lower) = &self.lower {
            attributes.push(("lower", format!("{:?}", lower)));
        }
        if let Some(upper) = &self.upper {
            attributes.push(("upper", format!("{:?}", upper)));
        }
        attributes.push((
            "value",
            self.values.iter().map(|v| format!("{:?}", v)).join(" "),
        ));
        attributes
    }
}

/// Shape summary of a tree state node, enough to size tree operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeShape {
    pub internal_node_count: usize,
    pub root_height: f64,
}

/// What role an object plays in the MCMC run.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    RealParameter(Parameter<f64>),
    IntegerParameter(Parameter<i64>),
    BooleanParameter(Parameter<bool>),
    Tree(TreeShape),
    Distribution,
    Operator,
    Logger,
    Plain,
}

/// One object of the BEAST object graph.
#[derive(Debug, Clone, PartialEq)]
pub struct BeastObject {
    id: Option<String>,
    spec: String,
    kind: ObjectKind,
    inputs: Vec<(String, Input)>,
}

impl BeastObject {
    pub fn new(spec: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            id: None,
            spec: spec.into(),
            kind,
            inputs: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_input(mut self, name: &str, input: impl Into<Input>) -> Self {
        self.set_input(name, input);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Fully qualified BEAST class, e.g. `beast.core.parameter.RealParameter`.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    /// Replaces the class and payload while keeping the id and inputs.
    pub fn retype(&mut self, spec: impl Into<String>, kind: ObjectKind) {
        self.spec = spec.into();
        self.kind = kind;
    }

    /// Sets an input, replacing any previous input of the same name in place.
    pub fn set_input(&mut self, name: &str, input: impl Into<Input>) {
        let input = input.into();
        match self.inputs.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = input,
            None => self.inputs.push((name.to_string(), input)),
        }
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|(n, _)| n == name).map(|(_, i)| i)
    }

    pub fn inputs(&self) -> impl Iterator<Item = (&str, &Input)> {
        self.inputs.iter().map(|(n, i)| (n.as_str(), i))
    }

    /// Objects referenced by this object's inputs, in input order.
    pub fn references(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.inputs.iter().flat_map(|(_, input)| match input {
            Input::Value(_) => Vec::new(),
            Input::Object(id) => vec![*id],
            Input::Objects(ids) => ids.clone(),
        })
    }

    pub fn is_distribution(&self) -> bool {
        matches!(self.kind, ObjectKind::Distribution)
    }

    /// Parameters and trees can be part of the MCMC state.
    pub fn is_state_node(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::RealParameter(_)
                | ObjectKind::IntegerParameter(_)
                | ObjectKind::BooleanParameter(_)
                | ObjectKind::Tree(_)
        )
    }

    /// Number of components of a parameter, `None` for anything else.
    pub fn dimension(&self) -> Option<usize> {
        match &self.kind {
            ObjectKind::RealParameter(p) => Some(p.dimension()),
            ObjectKind::IntegerParameter(p) => Some(p.dimension()),
            ObjectKind::BooleanParameter(p) => Some(p.dimension()),
            _ => None,
        }
    }

    pub(crate) fn payload_attributes(&self) -> Vec<(&'static str, String)> {
        match &self.kind {
            ObjectKind::RealParameter(p) => p.attributes(),
            ObjectKind::IntegerParameter(p) => p.attributes(),
            ObjectKind::BooleanParameter(p) => p.attributes(),
            _ => Vec::new(),
        }
    }
}
