// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::context::BeastContext;
use crate::error::TranslationError;
use crate::registry::ValueToBeast;
use beast_objects::{specs, BeastObject, ObjectId, ObjectKind, TreeShape};
use model_graph::{Value, ValueId, ValueType};

/// Numbers, booleans, their arrays and real matrices become BEAST parameters named after
/// the value.
pub struct ParameterValueToBeast {
    value_type: ValueType,
}

impl ParameterValueToBeast {
    pub fn new(value_type: ValueType) -> Self {
        Self { value_type }
    }
}

impl ValueToBeast for ParameterValueToBeast {
    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn value_to_beast(
        &self,
        value: ValueId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<ObjectId, TranslationError> {
        let node = ctx.graph().value(value);
        let id = node.id();
        let objects = ctx.objects_mut();
        let object = match node.value() {
            Value::Double(x) => objects.real_parameter(id, vec![*x]),
            Value::DoubleArray(v) => objects.real_parameter(id, v.clone()),
            Value::Integer(x) => objects.integer_parameter(id, vec![*x]),
            Value::IntegerArray(v) => objects.integer_parameter(id, v.clone()),
            Value::Boolean(x) => objects.boolean_parameter(id, vec![*x]),
            Value::BooleanArray(v) => objects.boolean_parameter(id, v.clone()),
            Value::DoubleMatrix(rows) => {
                let columns = rows.first().map_or(0, Vec::len);
                let parameter = objects.real_parameter(id, rows.iter().flatten().copied().collect());
                if let ObjectKind::RealParameter(p) = objects.get_mut(parameter).kind_mut() {
                    p.minor_dimension = Some(columns);
                }
                parameter
            }
            other => {
                return Err(TranslationError::Coercion {
                    id: id.unwrap_or_default().to_string(),
                    spec: other.value_type().to_string(),
                    target: "Parameter",
                })
            }
        };
        Ok(object)
    }
}

/// A time tree becomes a `TreeParser` over its Newick string, with taxa shared through
/// the context.
pub struct TimeTreeToBeast;

impl ValueToBeast for TimeTreeToBeast {
    fn value_type(&self) -> ValueType {
        ValueType::TimeTree
    }

    fn value_to_beast(
        &self,
        value: ValueId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<ObjectId, TranslationError> {
        let node = ctx.graph().value(value);
        let Value::TimeTree(tree) = node.value() else {
            return Err(TranslationError::Coercion {
                id: node.id().unwrap_or_default().to_string(),
                spec: node.value().value_type().to_string(),
                target: "Tree",
            });
        };

        let taxa = ctx.create_taxon_list(tree.taxa());
        let objects = ctx.objects_mut();
        let taxon_set = objects.add(BeastObject::new(specs::TAXON_SET, ObjectKind::Plain).with_input("taxon", taxa));
        let mut parser = BeastObject::new(
            specs::TREE_PARSER,
            ObjectKind::Tree(TreeShape {
                internal_node_count: tree.internal_node_count(),
                root_height: tree.root_height(),
            }),
        )
        .with_input("newick", tree.to_newick())
        .with_input("IsLabelledNewick", true)
        .with_input("adjustTipHeights", false)
        .with_input("taxonset", taxon_set);
        if let Some(id) = node.id() {
            parser.set_id(id);
        }
        Ok(objects.add(parser))
    }
}

/// An alignment becomes a BEAST `Alignment` with one `Sequence` per taxon.
pub struct AlignmentToBeast;

impl ValueToBeast for AlignmentToBeast {
    fn value_type(&self) -> ValueType {
        ValueType::Alignment
    }

    fn value_to_beast(
        &self,
        value: ValueId,
        ctx: &mut BeastContext<'_>,
    ) -> Result<ObjectId, TranslationError> {
        let node = ctx.graph().value(value);
        let Value::Alignment(alignment) = node.value() else {
            return Err(TranslationError::Coercion {
                id: node.id().unwrap_or_default().to_string(),
                spec: node.value().value_type().to_string(),
                target: "Alignment",
            });
        };

        let data_type = ctx
            .data_type(alignment.data_type())
            .ok_or_else(|| TranslationError::UnresolvedDataType {
                id: node.id().unwrap_or_default().to_string(),
                data_type: alignment.data_type().to_string(),
            })?
            .to_string();
        ctx.create_taxon_list(alignment.taxa());
        let objects = ctx.objects_mut();
        let sequences: Vec<ObjectId> = alignment
            .sequences()
            .map(|(taxon, sequence)| {
                objects.add(
                    BeastObject::new(specs::SEQUENCE, ObjectKind::Plain)
                        .with_input("taxon", taxon)
                        .with_input("value", sequence),
                )
            })
            .collect();

        let mut object = BeastObject::new(specs::ALIGNMENT, ObjectKind::Plain)
            .with_input("dataType", data_type)
            .with_input("sequence", sequences);
        if let Some(id) = node.id() {
            object.set_id(id);
        }
        Ok(objects.add(object))
    }
}
