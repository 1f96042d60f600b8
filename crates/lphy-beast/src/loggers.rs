// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::context::BeastContext;
use beast_objects::{specs, BeastObject, ObjectId, ObjectKind};
use itertools::Itertools;

impl BeastContext<'_> {
    /// Screen logger, trace log and one tree log per tree state node.
    pub fn create_loggers(&mut self, log_every: u64, stem: &str) -> Vec<ObjectId> {
        let mut loggers = vec![
            self.create_logger("screenlog", log_every, None),
            self.create_logger("tracelog", log_every, Some(format!("{}.log", stem))),
        ];
        loggers.extend(self.create_tree_loggers(log_every, stem));
        loggers
    }

    fn create_logger(&mut self, id: &str, log_every: u64, file_name: Option<String>) -> ObjectId {
        let logged: Vec<ObjectId> = self
            .state
            .iter()
            .copied()
            .filter(|node| !matches!(self.objects.get(*node).kind(), ObjectKind::Tree(_)))
            .chain(self.extra_loggables.iter().copied())
            .collect();

        let mut logger = BeastObject::new(specs::LOGGER, ObjectKind::Logger)
            .with_id(id)
            .with_input("logEvery", log_every);
        if let Some(file_name) = file_name {
            logger.set_input("fileName", file_name);
        }
        logger.set_input("log", logged);
        let logger = self.objects.add(logger);
        self.add_beast_object(logger);
        logger
    }

    fn create_tree_loggers(&mut self, log_every: u64, stem: &str) -> Vec<ObjectId> {
        let objects = &self.objects;
        let trees: Vec<ObjectId> = self
            .state
            .iter()
            .copied()
            .filter(|node| matches!(objects.get(*node).kind(), ObjectKind::Tree(_)))
            .sorted_by(|a, b| objects.id_of(*a).cmp(objects.id_of(*b)))
            .collect();
        let multiple_trees = trees.len() > 1;

        let mut loggers = Vec::with_capacity(trees.len());
        for tree in trees {
            let tree_id = self.objects.id_of(tree).to_string();
            let file_name = if multiple_trees {
                format!("{}_{}.trees", stem, tree_id)
            } else {
                format!("{}.trees", stem)
            };
            let logger = self.objects.add(
                BeastObject::new(specs::LOGGER, ObjectKind::Logger)
                    .with_id(format!("{}.treeLogger", tree_id))
                    .with_input("logEvery", log_every)
                    .with_input("fileName", file_name)
                    .with_input("log", tree),
            );
            self.add_beast_object(logger);
            loggers.push(logger);
        }
        loggers
    }
}
