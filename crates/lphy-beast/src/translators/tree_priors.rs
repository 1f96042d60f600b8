// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use super::real_param;
use crate::context::BeastContext;
use crate::error::TranslationError;
use crate::registry::GeneratorToBeast;
use beast_objects::{specs, BeastObject, ObjectId, ObjectKind};
use model_graph::{GeneratorId, GeneratorKind};

/// Pure-birth tree prior. The taxon count parameter `n` is implied by the tree.
pub struct YuleToBeast;

impl GeneratorToBeast for YuleToBeast {
    fn generator_kind(&self) -> GeneratorKind {
        GeneratorKind::from_static("Yule")
    }

    fn generator_to_beast(
        &self,
        generator: GeneratorId,
        value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<Option<ObjectId>, TranslationError> {
        let birth_rate = real_param(ctx, generator, "lambda")?;
        let objects = ctx.objects_mut();
        let id = format!("{}.prior", objects.id_of(value));
        let yule = BeastObject::new(specs::YULE_MODEL, ObjectKind::Distribution)
            .with_id(id)
            .with_input("tree", value)
            .with_input("birthDiffRate", birth_rate);
        Ok(Some(objects.add(yule)))
    }
}
