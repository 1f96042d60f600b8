// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The built-in translator catalogue, registered as one plugin.

mod distributions;
mod likelihood;
mod substitution;
mod tree_priors;
mod values;

pub use distributions::ParametricPrior;
pub use likelihood::PhyloCtmcToBeast;
pub use substitution::{HkyToBeast, JukesCantorToBeast};
pub use tree_priors::YuleToBeast;
pub use values::{AlignmentToBeast, ParameterValueToBeast, TimeTreeToBeast};

use crate::context::BeastContext;
use crate::error::TranslationError;
use crate::registry::{GeneratorToBeast, TranslatorPlugin, ValueToBeast};
use beast_objects::ObjectId;
use model_graph::{GeneratorId, ValueId, ValueType};
use std::rc::Rc;

pub struct StandardTranslators;

impl TranslatorPlugin for StandardTranslators {
    fn name(&self) -> &str {
        "standard"
    }

    fn value_translators(&self) -> Vec<Rc<dyn ValueToBeast>> {
        let mut translators: Vec<Rc<dyn ValueToBeast>> = [
            ValueType::Double,
            ValueType::Integer,
            ValueType::Boolean,
            ValueType::DoubleArray,
            ValueType::IntegerArray,
            ValueType::BooleanArray,
            ValueType::DoubleMatrix,
        ]
        .into_iter()
        .map(|value_type| Rc::new(ParameterValueToBeast::new(value_type)) as Rc<dyn ValueToBeast>)
        .collect();
        translators.push(Rc::new(TimeTreeToBeast));
        translators.push(Rc::new(AlignmentToBeast));
        translators
    }

    fn generator_translators(&self) -> Vec<Rc<dyn GeneratorToBeast>> {
        let mut translators: Vec<Rc<dyn GeneratorToBeast>> = ParametricPrior::catalogue()
            .into_iter()
            .map(|prior| Rc::new(prior) as Rc<dyn GeneratorToBeast>)
            .collect();
        translators.push(Rc::new(YuleToBeast));
        translators.push(Rc::new(JukesCantorToBeast));
        translators.push(Rc::new(HkyToBeast));
        translators.push(Rc::new(PhyloCtmcToBeast));
        translators
    }

    fn data_types(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("nucleotide", "nucleotide"),
            ("dna", "nucleotide"),
            ("aminoacid", "aminoacid"),
            ("protein", "aminoacid"),
            ("binary", "binary"),
            ("standard", "standard"),
        ]
    }
}

pub fn standard_plugin() -> anyhow::Result<Box<dyn TranslatorPlugin>> {
    Ok(Box::new(StandardTranslators))
}

/// The model value bound to `param`, if the generator has one.
fn param_value(ctx: &BeastContext<'_>, generator: GeneratorId, param: &str) -> Option<ValueId> {
    ctx.graph().generator(generator).param(param)
}

/// The object of the value bound to `param`.
fn param_object(
    ctx: &BeastContext<'_>,
    generator: GeneratorId,
    param: &str,
) -> Result<ObjectId, TranslationError> {
    param_value(ctx, generator, param)
        .and_then(|value| ctx.beast_object(value))
        .ok_or_else(|| missing_input(ctx, generator, param))
}

/// The value bound to `param`, prepared for a real-valued input.
fn real_param(
    ctx: &mut BeastContext<'_>,
    generator: GeneratorId,
    param: &str,
) -> Result<ObjectId, TranslationError> {
    let value =
        param_value(ctx, generator, param).ok_or_else(|| missing_input(ctx, generator, param))?;
    ctx.as_real_parameter(value)
}

fn missing_input(ctx: &BeastContext<'_>, generator: GeneratorId, param: &str) -> TranslationError {
    TranslationError::MissingInput {
        translator: ctx.graph().generator(generator).kind().to_string(),
        param: param.to_string(),
    }
}
