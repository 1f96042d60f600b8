// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Nucleotide substitution models. The model value itself is a rate matrix; the BEAST
//! counterpart is the generator's object, picked up by the tree likelihood.

use super::{param_object, real_param};
use crate::context::BeastContext;
use crate::error::TranslationError;
use crate::registry::GeneratorToBeast;
use beast_objects::{specs, BeastObject, ObjectId, ObjectKind};
use model_graph::{GeneratorId, GeneratorKind};

const NUCLEOTIDES: [&str; 4] = ["A", "C", "G", "T"];

pub struct JukesCantorToBeast;

impl GeneratorToBeast for JukesCantorToBeast {
    fn generator_kind(&self) -> GeneratorKind {
        GeneratorKind::from_static("JukesCantor")
    }

    fn generator_to_beast(
        &self,
        _generator: GeneratorId,
        _value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<Option<ObjectId>, TranslationError> {
        Ok(Some(
            ctx.objects_mut()
                .add(BeastObject::new(specs::JUKES_CANTOR, ObjectKind::Plain)),
        ))
    }
}

pub struct HkyToBeast;

impl GeneratorToBeast for HkyToBeast {
    fn generator_kind(&self) -> GeneratorKind {
        GeneratorKind::from_static("HKY")
    }

    fn modify_beast_values(
        &self,
        generator: GeneratorId,
        _value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<(), TranslationError> {
        let kappa = param_object(ctx, generator, "kappa")?;
        let freq = param_object(ctx, generator, "freq")?;
        let objects = ctx.objects_mut();
        objects.tighten_bounds(kappa, Some(0.0), None);
        objects.tighten_bounds(freq, Some(0.0), Some(1.0));
        Ok(())
    }

    fn generator_to_beast(
        &self,
        generator: GeneratorId,
        _value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<Option<ObjectId>, TranslationError> {
        let kappa = real_param(ctx, generator, "kappa")?;
        let freq = real_param(ctx, generator, "freq")?;
        let objects = ctx.objects_mut();
        let frequencies = objects.frequencies(freq, &NUCLEOTIDES);
        let hky = BeastObject::new(specs::HKY, ObjectKind::Plain)
            .with_input("kappa", kappa)
            .with_input("frequencies", frequencies);
        Ok(Some(objects.add(hky)))
    }
}
