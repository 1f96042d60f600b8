// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::context::BeastContext;
use crate::error::TranslationError;
use crate::posterior::Posterior;
use beast_objects::{specs, to_xml, BeastGraph, BeastObject, ObjectId, ObjectKind};
use log::info;

/// Everything one MCMC run is made of. `run` is the `MCMC` object itself.
#[derive(Debug, Clone)]
pub struct McmcRun {
    pub run: ObjectId,
    pub posterior: Posterior,
    pub state: ObjectId,
    pub state_nodes: Vec<ObjectId>,
    pub operators: Vec<ObjectId>,
    pub loggers: Vec<ObjectId>,
    pub inits: Vec<ObjectId>,
}

/// Executes an assembled run, e.g. by handing it to a BEAST installation.
pub trait McmcRunner {
    fn run(&self, objects: &BeastGraph, run: &McmcRun) -> anyhow::Result<()>;
}

impl BeastContext<'_> {
    /// Translates the model and assembles the MCMC run.
    ///
    /// A context builds one run; after a success or a failure, [`BeastContext::clear`]
    /// must be called before building another.
    pub fn create_mcmc(
        &mut self,
        chain_length: u64,
        log_every: u64,
        stem: &str,
    ) -> Result<McmcRun, TranslationError> {
        if self.used {
            return Err(TranslationError::StaleContext);
        }
        self.used = true;

        self.build_target_graph()?;
        let posterior = self.create_posterior();
        let operators = self.create_operators();
        let loggers = self.create_loggers(log_every, stem);

        let state_nodes = self.state.clone();
        let state = self.objects.add(
            BeastObject::new(specs::STATE, ObjectKind::Plain)
                .with_id("state")
                .with_input("stateNode", state_nodes.clone()),
        );
        self.add_beast_object(state);

        let inits = self.inits.clone();
        let mut mcmc = BeastObject::new(specs::MCMC, ObjectKind::Plain)
            .with_id("mcmc")
            .with_input("chainLength", chain_length)
            .with_input("state", state);
        if !inits.is_empty() {
            mcmc.set_input("init", inits.clone());
        }
        mcmc.set_input("distribution", posterior.posterior);
        mcmc.set_input("operator", operators.clone());
        mcmc.set_input("logger", loggers.clone());
        let run = self.objects.add(mcmc);
        self.add_beast_object(run);

        info!(
            "assembled run: {} state nodes, {} operators, {} loggers",
            state_nodes.len(),
            operators.len(),
            loggers.len()
        );
        Ok(McmcRun {
            run,
            posterior,
            state,
            state_nodes,
            operators,
            loggers,
            inits,
        })
    }

    /// Assembles the run with the configured chain length and serialises it to XML.
    pub fn to_beast_xml(&mut self, stem: &str) -> Result<String, TranslationError> {
        let (chain_length, log_every) = (self.options().chain_length, self.options().log_every);
        let run = self.create_mcmc(chain_length, log_every, stem)?;
        Ok(to_xml(self.objects(), run.run)?)
    }

    /// Assembles the run with the configured chain length and executes it.
    pub fn run_beast(&mut self, runner: &dyn McmcRunner, stem: &str) -> anyhow::Result<()> {
        let (chain_length, log_every) = (self.options().chain_length, self.options().log_every);
        let run = self.create_mcmc(chain_length, log_every, stem)?;
        runner.run(self.objects(), &run)
    }
}
