// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Translation context: the per-run store mapping model nodes to BEAST objects, and the
//! traversal that fills it.

use crate::error::TranslationError;
use crate::exclusion::{is_excluded_generator, is_excluded_value};
use crate::options::Options;
use crate::registry::TranslatorRegistry;
use beast_objects::{BeastGraph, ObjectId, ObjectKind};
use bimap::BiBTreeMap;
use indexmap::IndexSet;
use log::{debug, warn};
use model_graph::{Context, GeneratorId, ModelGraph, NodeRef, Value, ValueId};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

/// Which translator hook a generator walk invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    ModifyValues,
    CreateGenerators,
}

pub struct BeastContext<'g> {
    graph: &'g ModelGraph,
    registry: Rc<TranslatorRegistry>,
    options: Options,

    pub(crate) objects: BeastGraph,
    node_to_object: BiBTreeMap<NodeRef, ObjectId>,
    /// Every object produced so far, in creation order.
    pub(crate) elements: IndexSet<ObjectId>,
    pub(crate) state: Vec<ObjectId>,
    pub(crate) inits: Vec<ObjectId>,
    pub(crate) extra_operators: Vec<ObjectId>,
    pub(crate) extra_loggables: Vec<ObjectId>,
    taxa: BTreeMap<String, ObjectId>,
    pub(crate) sinks: Vec<ValueId>,
    /// Set once a run has been assembled or attempted; reset by [`BeastContext::clear`].
    pub(crate) used: bool,
}

impl<'g> BeastContext<'g> {
    pub fn new(graph: &'g ModelGraph, registry: Rc<TranslatorRegistry>, options: Options) -> Self {
        Self {
            graph,
            registry,
            options,
            objects: BeastGraph::new(),
            node_to_object: BiBTreeMap::new(),
            elements: IndexSet::new(),
            state: Vec::new(),
            inits: Vec::new(),
            extra_operators: Vec::new(),
            extra_loggables: Vec::new(),
            taxa: BTreeMap::new(),
            sinks: Vec::new(),
            used: false,
        }
    }

    pub fn graph(&self) -> &'g ModelGraph {
        self.graph
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The BEAST data type registered for a sequence type.
    pub fn data_type(&self, sequence_type: &str) -> Option<&str> {
        self.registry.lookup_data_type(sequence_type)
    }

    pub fn objects(&self) -> &BeastGraph {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut BeastGraph {
        &mut self.objects
    }

    /// State nodes in the order they entered the state.
    pub fn state_nodes(&self) -> &[ObjectId] {
        &self.state
    }

    pub fn elements(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.elements.iter().copied()
    }

    pub fn beast_object(&self, node: impl Into<NodeRef>) -> Option<ObjectId> {
        self.node_to_object.get_by_left(&node.into()).copied()
    }

    /// Finds an object by id among produced objects, then among mapped ones.
    pub fn beast_object_by_id(&self, id: &str) -> Option<ObjectId> {
        let has_id = |obj: &ObjectId| self.objects.get(*obj).id() == Some(id);
        self.elements
            .iter()
            .copied()
            .find(has_id)
            .or_else(|| self.node_to_object.right_values().copied().find(has_id))
    }

    pub fn graph_node(&self, object: ObjectId) -> Option<NodeRef> {
        self.node_to_object.get_by_right(&object).copied()
    }

    /// The object of `value` for a real-valued input.
    ///
    /// An integer parameter that is not a state node is turned into a real parameter in
    /// place. Integer state nodes stay integer so they keep their integer proposals; BEAST
    /// distributions read them through the same `Function` interface as real parameters.
    pub fn as_real_parameter(&mut self, value: ValueId) -> Result<ObjectId, TranslationError> {
        let Some(object) = self.beast_object(value) else {
            return Err(TranslationError::Coercion {
                id: self.graph.value(value).id().unwrap_or_default().to_string(),
                spec: "untranslated value".to_string(),
                target: "RealParameter",
            });
        };
        let existing = self.objects.get(object);
        match existing.kind() {
            ObjectKind::RealParameter(_) => Ok(object),
            ObjectKind::IntegerParameter(_) if self.state.contains(&object) => Ok(object),
            ObjectKind::IntegerParameter(_) => {
                self.objects.integer_to_real(object);
                debug!("coerced {} to a real parameter", self.objects.id_of(object));
                Ok(object)
            }
            _ => Err(TranslationError::Coercion {
                id: existing.id().unwrap_or_default().to_string(),
                spec: existing.spec().to_string(),
                target: "RealParameter",
            }),
        }
    }

    pub fn add_beast_object(&mut self, object: ObjectId) {
        self.elements.insert(object);
    }

    pub fn add_state_node(&mut self, object: ObjectId) {
        if !self.state.contains(&object) {
            self.elements.insert(object);
            self.state.push(object);
        }
    }

    pub fn remove_beast_object(&mut self, object: ObjectId) {
        self.elements.shift_remove(&object);
        self.state.retain(|o| *o != object);
        self.node_to_object.remove_by_right(&object);
    }

    /// Maps `node` to `object` as if a translator had returned it.
    pub fn put_beast_object(
        &mut self,
        node: impl Into<NodeRef>,
        object: ObjectId,
    ) -> Result<(), TranslationError> {
        self.add_to_context(node.into(), object)
    }

    pub fn add_extra_operator(&mut self, operator: ObjectId) {
        self.extra_operators.push(operator);
    }

    pub fn add_extra_loggable(&mut self, loggable: ObjectId) {
        self.extra_loggables.push(loggable);
    }

    pub fn add_init(&mut self, init: ObjectId) {
        self.inits.push(init);
    }

    /// The taxon with this id, created on first use.
    pub fn taxon(&mut self, id: &str) -> ObjectId {
        if let Some(taxon) = self.taxa.get(id) {
            return *taxon;
        }
        let taxon = self.objects.taxon(id);
        self.taxa.insert(id.to_string(), taxon);
        taxon
    }

    pub fn create_taxon_list<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> Vec<ObjectId> {
        ids.into_iter().map(|id| self.taxon(id)).collect()
    }

    /// Translated values holding alignments.
    pub fn alignments(&self) -> Vec<ValueId> {
        self.node_to_object
            .left_values()
            .filter_map(|node| match node {
                NodeRef::Value(value) => Some(*value),
                NodeRef::Generator(_) => None,
            })
            .filter(|value| matches!(self.graph.value(*value).value(), Value::Alignment(_)))
            .collect()
    }

    /// Resets every map and list so the context can build another run.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.node_to_object.clear();
        self.elements.clear();
        self.state.clear();
        self.inits.clear();
        self.extra_operators.clear();
        self.extra_loggables.clear();
        self.taxa.clear();
        self.sinks.clear();
        self.used = false;
    }

    /// True iff `id` names an observed data value and a model random variable.
    pub fn is_clamped(&self, id: &str) -> bool {
        self.graph.get(id, Context::Data).is_some()
            && self
                .graph
                .get(id, Context::Model)
                .map_or(false, |model| self.graph.is_random_variable(model))
    }

    /// The data value with this id, else the model value.
    pub fn clamped_value(&self, id: &str) -> Option<ValueId> {
        self.graph
            .get(id, Context::Data)
            .or_else(|| self.graph.get(id, Context::Model))
    }

    /// Translates every node reachable from the model sinks.
    pub fn build_target_graph(&mut self) -> Result<(), TranslationError> {
        let sinks = self.graph.model_sinks();
        debug!("translating from {} model sinks", sinks.len());
        self.sinks = sinks.clone();

        self.create_value_objects(&sinks)?;
        self.traverse_generators(&sinks, Phase::ModifyValues)?;
        self.traverse_generators(&sinks, Phase::CreateGenerators)?;
        Ok(())
    }

    fn create_value_objects(&mut self, sinks: &[ValueId]) -> Result<(), TranslationError> {
        let graph = self.graph;
        let mut visited: HashSet<ValueId> = HashSet::new();
        let mut stack: Vec<ValueId> = sinks.iter().rev().copied().collect();
        while let Some(value) = stack.pop() {
            if !visited.insert(value) {
                continue;
            }
            if self.beast_object(value).is_none() {
                self.value_to_beast(value)?;
            }

            let node = graph.value(value);
            if let Some(id) = node.id().filter(|id| self.is_clamped(id)) {
                if let Some(data) = graph.get(id, Context::Data) {
                    if self.beast_object(data).is_none() {
                        self.value_to_beast(data)?;
                    }
                }
            }
            if let Some(generator) = node.generator() {
                stack.extend(graph.generator(generator).params().rev().map(|(_, input)| input));
            }
        }
        Ok(())
    }

    fn value_to_beast(&mut self, value: ValueId) -> Result<(), TranslationError> {
        let graph = self.graph;
        let node = graph.value(value);
        let value_type = node.value().value_type();
        match self.registry.lookup_value(&value_type) {
            Some(translator) => {
                let object = translator.value_to_beast(value, self)?;
                self.add_to_context(NodeRef::Value(value), object)
            }
            None if is_excluded_value(node.value()) => Ok(()),
            None => Err(TranslationError::UnresolvedValue {
                id: node.id().unwrap_or("<anonymous>").to_string(),
                value_type,
            }),
        }
    }

    /// Post-order walk over the generators reachable from `sinks`, each visited once.
    fn traverse_generators(&mut self, sinks: &[ValueId], phase: Phase) -> Result<(), TranslationError> {
        enum Visit {
            Enter(ValueId),
            Exit(ValueId, GeneratorId),
        }

        let graph = self.graph;
        let mut visited: HashSet<GeneratorId> = HashSet::new();
        let mut stack: Vec<Visit> = sinks.iter().rev().map(|s| Visit::Enter(*s)).collect();
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(value) => {
                    let Some(generator) = graph.value(value).generator() else {
                        continue;
                    };
                    if visited.contains(&generator) {
                        continue;
                    }
                    stack.push(Visit::Exit(value, generator));
                    stack.extend(
                        graph
                            .generator(generator)
                            .params()
                            .rev()
                            .map(|(_, input)| Visit::Enter(input)),
                    );
                }
                Visit::Exit(value, generator) => {
                    if visited.insert(generator) {
                        self.generator_to_beast(value, generator, phase)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn generator_to_beast(
        &mut self,
        value: ValueId,
        generator: GeneratorId,
        phase: Phase,
    ) -> Result<(), TranslationError> {
        if self.beast_object(generator).is_some() {
            return Ok(());
        }

        let graph = self.graph;
        let node = graph.generator(generator);
        let excluded = is_excluded_generator(node.kind(), &self.options);
        let unresolved = || TranslationError::UnresolvedGenerator {
            index: generator.index(),
            kind: node.kind().to_string(),
            output: graph.value(value).id().unwrap_or("<anonymous>").to_string(),
        };

        let Some(translator) = self.registry.lookup_generator(node.kind()) else {
            return match phase {
                Phase::CreateGenerators if !excluded => Err(unresolved()),
                _ => Ok(()),
            };
        };

        let Some(modeled) = self.modeled_value(value, generator) else {
            return match phase {
                Phase::CreateGenerators if !excluded => Err(unresolved()),
                _ => {
                    debug!("no object for the output of {}, skipping", node.kind());
                    Ok(())
                }
            };
        };

        match phase {
            Phase::ModifyValues => translator.modify_beast_values(generator, modeled, self),
            Phase::CreateGenerators => match translator.generator_to_beast(generator, modeled, self)? {
                Some(object) => {
                    debug!("{} -> {}", node.kind(), self.objects.get(object).spec());
                    self.add_to_context(NodeRef::Generator(generator), object)
                }
                None if excluded => Ok(()),
                None => Err(unresolved()),
            },
        }
    }

    /// The object a generator's translator receives as its output: the observed data
    /// object when a distribution's output is clamped, else the output's own object.
    fn modeled_value(&self, value: ValueId, generator: GeneratorId) -> Option<ObjectId> {
        let graph = self.graph;
        if graph.generator(generator).is_distribution() {
            if let Some(id) = graph.value(value).id().filter(|id| self.is_clamped(id)) {
                return self.clamped_value(id).and_then(|clamped| self.beast_object(clamped));
            }
        }
        self.beast_object(value)
    }

    fn add_to_context(&mut self, node: NodeRef, object: ObjectId) -> Result<(), TranslationError> {
        self.node_to_object.insert(node, object);
        self.elements.insert(object);

        let NodeRef::Value(value) = node else {
            return Ok(());
        };
        let graph = self.graph;
        let value_node = graph.value(value);
        if !graph.is_random_variable(value) || value_node.outputs().is_empty() {
            return Ok(());
        }
        if self.state.contains(&object) {
            return Ok(());
        }

        let beast_object = self.objects.get(object);
        if !beast_object.is_state_node() {
            return Err(TranslationError::Coercion {
                id: beast_object.id().unwrap_or_default().to_string(),
                spec: beast_object.spec().to_string(),
                target: "StateNode",
            });
        }
        if let Some(id) = value_node.id().filter(|id| self.is_clamped(id)) {
            warn!("`{}` is observed but also consumed downstream; it stays in the state", id);
        }
        self.state.push(object);
        Ok(())
    }
}
