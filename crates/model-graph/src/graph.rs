// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::value::{TypeTag, Value};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};

/// Index of a value node in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(usize);

/// Index of a generator node in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratorId(usize);

impl ValueId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl GeneratorId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Either kind of graph node. Equality is node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRef {
    Value(ValueId),
    Generator(GeneratorId),
}

impl From<ValueId> for NodeRef {
    fn from(id: ValueId) -> Self {
        NodeRef::Value(id)
    }
}

impl From<GeneratorId> for NodeRef {
    fn from(id: GeneratorId) -> Self {
        NodeRef::Generator(id)
    }
}

/// The block a value was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Data,
    Model,
}

impl Display for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Context::Data => write!(f, "data"),
            Context::Model => write!(f, "model"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorCategory {
    /// Output is a random variable.
    Distribution,
    Function,
}

/// Stable type tag of a generator, e.g. `LogNormal` or `PhyloCTMC`.
///
/// A dotted kind such as `Coalescent.Serial` is a specialisation of `Coalescent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratorKind(Cow<'static, str>);

impl GeneratorKind {
    pub const DIRICHLET: GeneratorKind = GeneratorKind::from_static("Dirichlet");
    pub const RANDOM_COMPOSITION: GeneratorKind = GeneratorKind::from_static("RandomComposition");

    pub const fn from_static(name: &'static str) -> Self {
        GeneratorKind(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        GeneratorKind(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl TypeTag for GeneratorKind {
    fn is_assignable_from(&self, other: &Self) -> bool {
        other.0 == self.0
            || other
                .0
                .strip_prefix(&*self.0)
                .map_or(false, |rest| rest.starts_with('.'))
    }
}

impl Display for GeneratorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GeneratorKind {
    fn from(name: &str) -> Self {
        GeneratorKind::new(name)
    }
}

#[derive(Debug, Clone)]
pub struct ValueNode {
    id: Option<String>,
    value: Value,
    generator: Option<GeneratorId>,
    outputs: Vec<GeneratorId>,
    context: Context,
}

impl ValueNode {
    /// The declared identifier; `None` for anonymous constants.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The generator that produced this value, `None` for leaves.
    pub fn generator(&self) -> Option<GeneratorId> {
        self.generator
    }

    /// Generators consuming this value.
    pub fn outputs(&self) -> &[GeneratorId] {
        &self.outputs
    }

    pub fn context(&self) -> Context {
        self.context
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorNode {
    kind: GeneratorKind,
    category: GeneratorCategory,
    params: IndexMap<String, ValueId>,
    outputs: Vec<ValueId>,
}

impl GeneratorNode {
    pub fn kind(&self) -> &GeneratorKind {
        &self.kind
    }

    pub fn category(&self) -> GeneratorCategory {
        self.category
    }

    pub fn is_distribution(&self) -> bool {
        self.category == GeneratorCategory::Distribution
    }

    /// Named inputs in declaration order.
    pub fn params(&self) -> impl DoubleEndedIterator<Item = (&str, ValueId)> + '_ {
        self.params.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn param(&self, name: &str) -> Option<ValueId> {
        self.params.get(name).copied()
    }

    pub fn outputs(&self) -> &[ValueId] {
        &self.outputs
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("`{id}` is already declared in the {context} block")]
    DuplicateId { id: String, context: Context },
}

/// Arena holding every node of one parsed model.
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    values: Vec<ValueNode>,
    generators: Vec<GeneratorNode>,
    data: IndexMap<String, ValueId>,
    model: IndexMap<String, ValueId>,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an anonymous constant leaf.
    pub fn constant(&mut self, context: Context, value: Value) -> ValueId {
        self.push_value(None, value, None, context)
    }

    /// Adds a named leaf to the dictionary of `context`.
    pub fn add_value(
        &mut self,
        context: Context,
        id: impl Into<String>,
        value: Value,
    ) -> Result<ValueId, GraphError> {
        let id = id.into();
        self.check_unique(&id, context)?;
        let value_id = self.push_value(Some(id.clone()), value, None, context);
        self.dictionary_mut(context).insert(id, value_id);
        Ok(value_id)
    }

    /// Applies a generator to `params`, producing a named output value.
    pub fn apply<S: Into<String>>(
        &mut self,
        context: Context,
        kind: impl Into<GeneratorKind>,
        category: GeneratorCategory,
        params: impl IntoIterator<Item = (S, ValueId)>,
        id: impl Into<String>,
        value: Value,
    ) -> Result<ValueId, GraphError> {
        let id = id.into();
        self.check_unique(&id, context)?;

        let generator_id = GeneratorId(self.generators.len());
        let params: IndexMap<String, ValueId> =
            params.into_iter().map(|(name, v)| (name.into(), v)).collect();
        for input in params.values() {
            let outputs = &mut self.values[input.0].outputs;
            if !outputs.contains(&generator_id) {
                outputs.push(generator_id);
            }
        }
        self.generators.push(GeneratorNode {
            kind: kind.into(),
            category,
            params,
            outputs: Vec::new(),
        });

        let value_id = self.push_value(Some(id.clone()), value, Some(generator_id), context);
        self.generators[generator_id.0].outputs.push(value_id);
        self.dictionary_mut(context).insert(id, value_id);
        Ok(value_id)
    }

    /// Shorthand for `id ~ kind(params)`.
    pub fn sample<S: Into<String>>(
        &mut self,
        kind: impl Into<GeneratorKind>,
        params: impl IntoIterator<Item = (S, ValueId)>,
        id: impl Into<String>,
        value: Value,
    ) -> Result<ValueId, GraphError> {
        self.apply(Context::Model, kind, GeneratorCategory::Distribution, params, id, value)
    }

    /// Shorthand for `id = kind(params)` in the model block.
    pub fn compute<S: Into<String>>(
        &mut self,
        kind: impl Into<GeneratorKind>,
        params: impl IntoIterator<Item = (S, ValueId)>,
        id: impl Into<String>,
        value: Value,
    ) -> Result<ValueId, GraphError> {
        self.apply(Context::Model, kind, GeneratorCategory::Function, params, id, value)
    }

    pub fn value(&self, id: ValueId) -> &ValueNode {
        &self.values[id.0]
    }

    pub fn generator(&self, id: GeneratorId) -> &GeneratorNode {
        &self.generators[id.0]
    }

    pub fn values(&self) -> impl Iterator<Item = (ValueId, &ValueNode)> {
        self.values.iter().enumerate().map(|(i, v)| (ValueId(i), v))
    }

    pub fn generators(&self) -> impl Iterator<Item = (GeneratorId, &GeneratorNode)> {
        self.generators.iter().enumerate().map(|(i, g)| (GeneratorId(i), g))
    }

    /// Looks up a declared id in one context.
    pub fn get(&self, id: &str, context: Context) -> Option<ValueId> {
        self.dictionary(context).get(id).copied()
    }

    pub fn dictionary(&self, context: Context) -> &IndexMap<String, ValueId> {
        match context {
            Context::Data => &self.data,
            Context::Model => &self.model,
        }
    }

    /// Named model-block values with no consumers, in declaration order.
    pub fn model_sinks(&self) -> Vec<ValueId> {
        self.model
            .values()
            .copied()
            .filter(|id| self.values[id.0].outputs.is_empty())
            .collect()
    }

    /// True iff the value was produced by a generative distribution.
    pub fn is_random_variable(&self, id: ValueId) -> bool {
        self.generative_distribution(id).is_some()
    }

    pub fn generative_distribution(&self, id: ValueId) -> Option<&GeneratorNode> {
        self.values[id.0]
            .generator
            .map(|g| &self.generators[g.0])
            .filter(|g| g.is_distribution())
    }

    fn push_value(
        &mut self,
        id: Option<String>,
        value: Value,
        generator: Option<GeneratorId>,
        context: Context,
    ) -> ValueId {
        let value_id = ValueId(self.values.len());
        self.values.push(ValueNode {
            id,
            value,
            generator,
            outputs: Vec::new(),
            context,
        });
        value_id
    }

    fn check_unique(&self, id: &str, context: Context) -> Result<(), GraphError> {
        if self.dictionary(context).contains_key(id) {
            return Err(GraphError::DuplicateId {
                id: id.to_string(),
                context,
            });
        }
        Ok(())
    }

    fn dictionary_mut(&mut self, context: Context) -> &mut IndexMap<String, ValueId> {
        match context {
            Context::Data => &mut self.data,
            Context::Model => &mut self.model,
        }
    }
}
