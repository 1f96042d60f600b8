// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Parametric distributions over scalars and vectors, translated to a BEAST `Prior`
//! wrapping the matching `ParametricDistribution`.

use super::{param_value, real_param};
use crate::context::BeastContext;
use crate::error::TranslationError;
use crate::registry::GeneratorToBeast;
use beast_objects::{specs, BeastObject, ObjectId, ObjectKind};
use model_graph::{GeneratorId, GeneratorKind};

/// How a model parameter feeds the BEAST distribution.
#[derive(Debug, Clone, Copy)]
enum Input {
    /// A `RealParameter` input.
    Parameter(&'static str, &'static str),
    /// A plain `double` input, read from the model value.
    Number(&'static str, &'static str),
}

#[derive(Debug, Clone)]
pub struct ParametricPrior {
    kind: &'static str,
    spec: &'static str,
    inputs: &'static [Input],
    /// Bounds of the distribution's support, applied to the sampled parameter.
    support: (Option<f64>, Option<f64>),
}

impl ParametricPrior {
    pub fn catalogue() -> Vec<ParametricPrior> {
        use Input::{Number, Parameter};
        vec![
            ParametricPrior {
                kind: "LogNormal",
                spec: specs::LOG_NORMAL,
                inputs: &[Parameter("meanlog", "M"), Parameter("sdlog", "S")],
                support: (Some(0.0), None),
            },
            ParametricPrior {
                kind: "Normal",
                spec: specs::NORMAL,
                inputs: &[Parameter("mean", "mean"), Parameter("sd", "sigma")],
                support: (None, None),
            },
            ParametricPrior {
                kind: "Exp",
                spec: specs::EXPONENTIAL,
                inputs: &[Parameter("mean", "mean")],
                support: (Some(0.0), None),
            },
            ParametricPrior {
                kind: "Gamma",
                spec: specs::GAMMA,
                inputs: &[Parameter("shape", "alpha"), Parameter("scale", "beta")],
                support: (Some(0.0), None),
            },
            ParametricPrior {
                kind: "Beta",
                spec: specs::BETA,
                inputs: &[Parameter("alpha", "alpha"), Parameter("beta", "beta")],
                support: (Some(0.0), Some(1.0)),
            },
            ParametricPrior {
                kind: "Uniform",
                spec: specs::UNIFORM,
                inputs: &[Number("lower", "lower"), Number("upper", "upper")],
                support: (None, None),
            },
            ParametricPrior {
                kind: "Dirichlet",
                spec: specs::DIRICHLET,
                inputs: &[Parameter("conc", "alpha")],
                support: (Some(0.0), Some(1.0)),
            },
            ParametricPrior {
                kind: "Poisson",
                spec: specs::POISSON,
                inputs: &[Parameter("lambda", "lambda")],
                support: (Some(0.0), None),
            },
        ]
    }

    fn number(ctx: &BeastContext<'_>, generator: GeneratorId, param: &str) -> Option<f64> {
        param_value(ctx, generator, param).and_then(|value| ctx.graph().value(value).value().as_f64())
    }
}

impl GeneratorToBeast for ParametricPrior {
    fn generator_kind(&self) -> GeneratorKind {
        GeneratorKind::from_static(self.kind)
    }

    fn modify_beast_values(
        &self,
        generator: GeneratorId,
        value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<(), TranslationError> {
        let (mut lower, mut upper) = self.support;
        if self.kind == "Uniform" {
            lower = Self::number(ctx, generator, "lower");
            upper = Self::number(ctx, generator, "upper");
        }
        ctx.objects_mut().tighten_bounds(value, lower, upper);
        Ok(())
    }

    fn generator_to_beast(
        &self,
        generator: GeneratorId,
        value: ObjectId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<Option<ObjectId>, TranslationError> {
        let mut distr = BeastObject::new(self.spec, ObjectKind::Plain);
        for input in self.inputs {
            match *input {
                Input::Parameter(param, name) => {
                    let parameter = real_param(ctx, generator, param)?;
                    distr.set_input(name, parameter);
                }
                Input::Number(param, name) => {
                    if let Some(number) = Self::number(ctx, generator, param) {
                        distr.set_input(name, number);
                    }
                }
            }
        }
        let objects = ctx.objects_mut();
        let distr = objects.add(distr);
        Ok(Some(objects.prior(distr, value)))
    }
}
