// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! LPhy to BEAST 2
//!
//! Translates a probabilistic model graph into a BEAST 2 object graph and assembles a
//! complete MCMC run from it: state, proposal operators, loggers and the
//! prior/likelihood/posterior composition. Translators for individual value and
//! generator kinds are looked up in a [`TranslatorRegistry`] filled by plugins.

mod context;
pub mod driver;
mod error;
pub mod exclusion;
mod loggers;
mod mcmc;
mod operators;
pub mod options;
mod posterior;
pub mod registry;
pub mod translators;

pub use context::BeastContext;
pub use error::TranslationError;
pub use mcmc::{McmcRun, McmcRunner};
pub use operators::operator_weight;
pub use options::Options;
pub use posterior::Posterior;
pub use registry::{
    GeneratorToBeast, PluginFactory, Registry, TranslatorPlugin, TranslatorRegistry, ValueToBeast,
};
