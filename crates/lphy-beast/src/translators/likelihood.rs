// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use super::{missing_input, param_object, param_value, real_param};
use crate::context::BeastContext;
use crate::error::TranslationError;
use crate::registry::GeneratorToBeast;
use beast_objects::{specs, BeastObject, ObjectId, ObjectKind};
use model_graph::{GeneratorId, GeneratorKind, NodeRef};

/// Phylogenetic continuous-time Markov chain over a tree: the tree likelihood of the
/// (usually observed) alignment.
pub struct PhyloCtmcToBeast;

impl GeneratorToBeast for PhyloCtmcToBeast {
    fn generator_kind(&self) -> GeneratorKind {
        GeneratorKind::from_static("PhyloCTMC")
    }

    fn generator_to_beast(
        &self,
        generator: GeneratorId,
        value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<Option<ObjectId>, TranslationError> {
        let tree = param_object(ctx, generator, "tree")?;
        let subst_model = param_value(ctx, generator, "Q")
            .and_then(|q| ctx.graph().value(q).generator())
            .and_then(|q_generator| ctx.beast_object(NodeRef::Generator(q_generator)))
            .ok_or_else(|| missing_input(ctx, generator, "Q"))?;
        let clock_rate = match param_value(ctx, generator, "mu") {
            Some(_) => real_param(ctx, generator, "mu")?,
            None => ctx.objects_mut().real_parameter(None, vec![1.0]),
        };

        let objects = ctx.objects_mut();
        let site_model = objects.add(
            BeastObject::new(specs::SITE_MODEL, ObjectKind::Plain).with_input("substModel", subst_model),
        );
        let clock = objects.add(
            BeastObject::new(specs::STRICT_CLOCK, ObjectKind::Plain).with_input("clock.rate", clock_rate),
        );
        let id = format!("{}.treeLikelihood", objects.id_of(value));
        let likelihood = BeastObject::new(specs::TREE_LIKELIHOOD, ObjectKind::Distribution)
            .with_id(id)
            .with_input("data", value)
            .with_input("tree", tree)
            .with_input("siteModel", site_model)
            .with_input("branchRateModel", clock);
        Ok(Some(objects.add(likelihood)))
    }
}
