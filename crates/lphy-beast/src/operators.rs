// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Default proposal operators for the state nodes.

use crate::context::BeastContext;
use beast_objects::{specs, BeastObject, ObjectId, ObjectKind, TreeShape};
use model_graph::{GeneratorKind, NodeRef, TypeTag};

const SCALE_FACTOR: f64 = 0.75;
const INTEGER_DELTA: f64 = 2.0;
const RANDOM_WALK_WINDOW: i64 = 1;

/// `size^0.7`, shared by every default operator.
pub fn operator_weight(size: usize) -> f64 {
    (size as f64).powf(0.7)
}

impl BeastContext<'_> {
    /// One bundle of operators per state node plus the extra operators, sorted by id.
    pub fn create_operators(&mut self) -> Vec<ObjectId> {
        let mut operators = Vec::new();
        for state_node in self.state.clone() {
            let object = self.objects.get(state_node);
            let name = object.id().unwrap_or_default().to_string();
            match object.kind().clone() {
                ObjectKind::RealParameter(p) => {
                    let operator = if self.generated_by(state_node, &GeneratorKind::DIRICHLET) {
                        delta_exchange(&name, "parameter", state_node, p.dimension())
                            .with_input("delta", 1.0 / p.dimension() as f64)
                    } else {
                        BeastObject::new(specs::SCALE_OPERATOR, ObjectKind::Operator)
                            .with_id(format!("{}.scale", name))
                            .with_input("parameter", state_node)
                            .with_input("weight", operator_weight(p.dimension()))
                            .with_input("scaleFactor", SCALE_FACTOR)
                    };
                    operators.push(self.add_operator(operator));
                }
                ObjectKind::IntegerParameter(p) => {
                    let operator = if self.generated_by(state_node, &GeneratorKind::RANDOM_COMPOSITION)
                    {
                        delta_exchange(&name, "intparameter", state_node, p.dimension())
                            .with_input("delta", INTEGER_DELTA)
                            .with_input("integer", true)
                    } else {
                        BeastObject::new(specs::INT_RANDOM_WALK_OPERATOR, ObjectKind::Operator)
                            .with_id(format!("{}.randomWalk", name))
                            .with_input("parameter", state_node)
                            .with_input("weight", operator_weight(p.dimension()))
                            .with_input("windowSize", RANDOM_WALK_WINDOW)
                    };
                    operators.push(self.add_operator(operator));
                }
                ObjectKind::BooleanParameter(p) => {
                    let operator = BeastObject::new(specs::BIT_FLIP_OPERATOR, ObjectKind::Operator)
                        .with_id(format!("{}.bitFlip", name))
                        .with_input("parameter", state_node)
                        .with_input("weight", operator_weight(p.dimension()));
                    operators.push(self.add_operator(operator));
                }
                ObjectKind::Tree(shape) => {
                    for operator in tree_operators(&name, state_node, shape) {
                        operators.push(self.add_operator(operator));
                    }
                }
                _ => {}
            }
        }

        operators.extend(self.extra_operators.iter().copied());
        let objects = &self.objects;
        operators.sort_by(|a, b| objects.id_of(*a).cmp(objects.id_of(*b)));
        log::info!("created {} operators", operators.len());
        operators
    }

    fn add_operator(&mut self, operator: BeastObject) -> ObjectId {
        let operator = self.objects.add(operator);
        self.add_beast_object(operator);
        operator
    }

    /// True iff the state node stands for a random variable drawn from `kind`.
    fn generated_by(&self, state_node: ObjectId, kind: &GeneratorKind) -> bool {
        match self.graph_node(state_node) {
            Some(NodeRef::Value(value)) => self
                .graph()
                .generative_distribution(value)
                .map_or(false, |g| kind.is_assignable_from(g.kind())),
            _ => false,
        }
    }
}

/// Sum-preserving move; one component fewer than the dimension is free.
fn delta_exchange(
    name: &str,
    parameter_input: &str,
    parameter: ObjectId,
    dimension: usize,
) -> BeastObject {
    BeastObject::new(specs::DELTA_EXCHANGE_OPERATOR, ObjectKind::Operator)
        .with_id(format!("{}.deltaExchange", name))
        .with_input(parameter_input, parameter)
        .with_input("weight", operator_weight(dimension.saturating_sub(1)))
}

fn tree_operators(name: &str, tree: ObjectId, shape: TreeShape) -> Vec<BeastObject> {
    let weight = operator_weight(shape.internal_node_count);
    let operator = |spec: &str, suffix: &str| {
        BeastObject::new(spec, ObjectKind::Operator)
            .with_id(format!("{}.{}", name, suffix))
            .with_input("tree", tree)
            .with_input("weight", weight)
    };
    vec![
        operator(specs::SCALE_OPERATOR, "scale"),
        operator(specs::EXCHANGE, "narrowExchange").with_input("isNarrow", true),
        operator(specs::EXCHANGE, "wideExchange").with_input("isNarrow", false),
        operator(specs::SUBTREE_SLIDE, "subtreeSlide").with_input("size", shape.root_height / 10.0),
        operator(specs::UNIFORM_OPERATOR, "uniform"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_weight() {
        assert_eq!(operator_weight(1), 1.0);
        assert_eq!(operator_weight(0), 0.0);
        assert_eq!(operator_weight(4), 4f64.powf(0.7));
        assert!(operator_weight(10) < 10.0);
    }
}
