// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::context::BeastContext;
use beast_objects::ObjectId;
use log::info;
use model_graph::NodeRef;

/// The prior/likelihood split of every distribution object and the three compounds.
#[derive(Debug, Clone)]
pub struct Posterior {
    pub posterior: ObjectId,
    pub prior: ObjectId,
    pub likelihood: ObjectId,
    pub priors: Vec<ObjectId>,
    pub likelihoods: Vec<ObjectId>,
}

impl BeastContext<'_> {
    /// Distributions produced for a generator of a model sink are likelihoods; every
    /// other distribution object, including ones injected by translators, is a prior.
    pub fn create_posterior(&mut self) -> Posterior {
        let mut priors = Vec::new();
        let mut likelihoods = Vec::new();
        for object in self.elements.iter().copied() {
            if !self.objects.get(object).is_distribution() {
                continue;
            }
            if self.is_sink_generator_object(object) {
                likelihoods.push(object);
            } else {
                priors.push(object);
            }
        }
        info!("found {} likelihoods", likelihoods.len());
        info!("found {} priors", priors.len());

        let prior = self.objects.compound_distribution("prior", priors.clone());
        let likelihood = self.objects.compound_distribution("likelihood", likelihoods.clone());
        let posterior = self
            .objects
            .compound_distribution("posterior", vec![prior, likelihood]);
        for compound in [prior, likelihood, posterior] {
            self.add_beast_object(compound);
        }

        Posterior {
            posterior,
            prior,
            likelihood,
            priors,
            likelihoods,
        }
    }

    fn is_sink_generator_object(&self, object: ObjectId) -> bool {
        let Some(NodeRef::Generator(generator)) = self.graph_node(object) else {
            return false;
        };
        let graph = self.graph();
        self.sinks
            .iter()
            .any(|sink| graph.value(*sink).generator() == Some(generator))
    }
}
