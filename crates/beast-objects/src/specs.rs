// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Fully qualified BEAST 2.6 class names.

pub const MCMC: &str = "beast.core.MCMC";
pub const STATE: &str = "beast.core.State";
pub const LOGGER: &str = "beast.core.Logger";
pub const COMPOUND_DISTRIBUTION: &str = "beast.core.util.CompoundDistribution";

pub const REAL_PARAMETER: &str = "beast.core.parameter.RealParameter";
pub const INTEGER_PARAMETER: &str = "beast.core.parameter.IntegerParameter";
pub const BOOLEAN_PARAMETER: &str = "beast.core.parameter.BooleanParameter";

pub const PRIOR: &str = "beast.math.distributions.Prior";
pub const LOG_NORMAL: &str = "beast.math.distributions.LogNormalDistributionModel";
pub const NORMAL: &str = "beast.math.distributions.Normal";
pub const EXPONENTIAL: &str = "beast.math.distributions.Exponential";
pub const GAMMA: &str = "beast.math.distributions.Gamma";
pub const BETA: &str = "beast.math.distributions.Beta";
pub const UNIFORM: &str = "beast.math.distributions.Uniform";
pub const DIRICHLET: &str = "beast.math.distributions.Dirichlet";
pub const POISSON: &str = "beast.math.distributions.Poisson";

pub const SCALE_OPERATOR: &str = "beast.evolution.operators.ScaleOperator";
pub const DELTA_EXCHANGE_OPERATOR: &str = "beast.evolution.operators.DeltaExchangeOperator";
pub const INT_RANDOM_WALK_OPERATOR: &str = "beast.evolution.operators.IntRandomWalkOperator";
pub const BIT_FLIP_OPERATOR: &str = "beast.evolution.operators.BitFlipOperator";
pub const EXCHANGE: &str = "beast.evolution.operators.Exchange";
pub const SUBTREE_SLIDE: &str = "beast.evolution.operators.SubtreeSlide";
pub const UNIFORM_OPERATOR: &str = "beast.evolution.operators.Uniform";

pub const TREE: &str = "beast.evolution.tree.Tree";
pub const TREE_PARSER: &str = "beast.util.TreeParser";
pub const TREE_WITH_META_DATA_LOGGER: &str = "beast.evolution.tree.TreeWithMetaDataLogger";
pub const YULE_MODEL: &str = "beast.evolution.speciation.YuleModel";

pub const TAXON: &str = "beast.evolution.alignment.Taxon";
pub const TAXON_SET: &str = "beast.evolution.alignment.TaxonSet";
pub const ALIGNMENT: &str = "beast.evolution.alignment.Alignment";
pub const SEQUENCE: &str = "beast.evolution.alignment.Sequence";

pub const JUKES_CANTOR: &str = "beast.evolution.substitutionmodel.JukesCantor";
pub const HKY: &str = "beast.evolution.substitutionmodel.HKY";
pub const FREQUENCIES: &str = "beast.evolution.substitutionmodel.Frequencies";
pub const SITE_MODEL: &str = "beast.evolution.sitemodel.SiteModel";
pub const STRICT_CLOCK: &str = "beast.evolution.branchratemodel.StrictClockModel";
pub const TREE_LIKELIHOOD: &str = "beast.evolution.likelihood.ThreadedTreeLikelihood";

/// Last dotted segment of a class name, used to name anonymous objects.
pub fn short_name(spec: &str) -> &str {
    spec.rsplit('.').next().unwrap_or(spec)
}
