// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Translator registry.
//!
//! Translators are looked up by the stable type tag of a runtime value or generator.
//! An exact match wins; otherwise the first registered tag assignable from the runtime
//! tag is used, in registration order. Plugins registering overlapping supertypes get
//! whichever came first, so catalogues should stick to disjoint tags.

use crate::context::BeastContext;
use crate::error::TranslationError;
use beast_objects::ObjectId;
use log::{debug, warn};
use model_graph::{GeneratorId, GeneratorKind, TypeTag, ValueId, ValueType};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;

/// Translates one kind of runtime value into a target object.
pub trait ValueToBeast {
    fn value_type(&self) -> ValueType;

    fn value_to_beast(
        &self,
        value: ValueId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<ObjectId, TranslationError>;
}

/// Translates one kind of generator.
///
/// `value` is the target object standing for the generator's output: the output's own
/// object, or the observed data object when the output is clamped.
pub trait GeneratorToBeast {
    fn generator_kind(&self) -> GeneratorKind;

    /// Adjusts already created value objects, e.g. tightening bounds. Runs for every
    /// generator before any generator object is created.
    fn modify_beast_values(
        &self,
        _generator: GeneratorId,
        _value: ObjectId,
        _ctx: &mut BeastContext<'_>,
    ) -> Result<(), TranslationError> {
        Ok(())
    }

    /// Creates the generator's own object. `None` means the generator has no counterpart.
    fn generator_to_beast(
        &self,
        generator: GeneratorId,
        value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<Option<ObjectId>, TranslationError>;
}

/// A bundle of translators contributed by one package.
pub trait TranslatorPlugin {
    fn name(&self) -> &str;

    fn value_translators(&self) -> Vec<Rc<dyn ValueToBeast>>;

    fn generator_translators(&self) -> Vec<Rc<dyn GeneratorToBeast>>;

    /// Sequence types of the model mapped to BEAST data type names.
    fn data_types(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }
}

pub type PluginFactory = fn() -> anyhow::Result<Box<dyn TranslatorPlugin>>;

/// Type-indexed table with supertype fallback.
pub struct Registry<K, T> {
    index: HashMap<K, usize>,
    entries: Vec<(K, T)>,
}

impl<K: TypeTag, T: Clone> Registry<K, T> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Registers `value` under `key`. Re-registering a key replaces the entry in place.
    pub fn register(&mut self, key: K, value: T) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn lookup(&self, key: &K) -> Option<T> {
        if let Some(&slot) = self.index.get(key) {
            return Some(self.entries[slot].1.clone());
        }
        self.entries
            .iter()
            .find(|(registered, _)| registered.is_assignable_from(key))
            .map(|(_, value)| value.clone())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: TypeTag, T: Clone> Default for Registry<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct TranslatorRegistry {
    values: Registry<ValueType, Rc<dyn ValueToBeast>>,
    generators: Registry<GeneratorKind, Rc<dyn GeneratorToBeast>>,
    data_types: IndexMap<String, String>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalogue.
    pub fn standard() -> Self {
        Self::from_plugins(&[crate::translators::standard_plugin])
    }

    /// Instantiates every plugin; a factory that fails is logged and skipped.
    pub fn from_plugins(factories: &[PluginFactory]) -> Self {
        let mut registry = Self::new();
        for factory in factories {
            match factory() {
                Ok(plugin) => registry.register_plugin(plugin.as_ref()),
                Err(err) => warn!("skipping translator plugin: {:#}", err),
            }
        }
        registry
    }

    pub fn register_plugin(&mut self, plugin: &dyn TranslatorPlugin) {
        let values = plugin.value_translators();
        let generators = plugin.generator_translators();
        let data_types = plugin.data_types();
        debug!(
            "registering plugin `{}`: {} value and {} generator translators, {} data types",
            plugin.name(),
            values.len(),
            generators.len(),
            data_types.len()
        );
        for translator in values {
            self.register_value(translator);
        }
        for translator in generators {
            self.register_generator(translator);
        }
        for (sequence_type, data_type) in data_types {
            self.register_data_type(sequence_type, data_type);
        }
    }

    pub fn register_value(&mut self, translator: Rc<dyn ValueToBeast>) {
        self.values.register(translator.value_type(), translator);
    }

    pub fn register_generator(&mut self, translator: Rc<dyn GeneratorToBeast>) {
        self.generators
            .register(translator.generator_kind(), translator);
    }

    /// Maps a sequence type, matched case-insensitively, to a BEAST data type. A later
    /// registration replaces an earlier one.
    pub fn register_data_type(&mut self, sequence_type: &str, data_type: &str) {
        self.data_types
            .insert(sequence_type.to_ascii_lowercase(), data_type.to_string());
    }

    pub fn lookup_data_type(&self, sequence_type: &str) -> Option<&str> {
        self.data_types
            .get(&sequence_type.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn lookup_value(&self, value_type: &ValueType) -> Option<Rc<dyn ValueToBeast>> {
        self.values.lookup(value_type)
    }

    pub fn lookup_generator(&self, kind: &GeneratorKind) -> Option<Rc<dyn GeneratorToBeast>> {
        self.generators.lookup(kind)
    }

    pub fn value_types(&self) -> impl Iterator<Item = &ValueType> {
        self.values.keys()
    }

    pub fn generator_kinds(&self) -> impl Iterator<Item = &GeneratorKind> {
        self.generators.keys()
    }
}
