// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::object::{BeastObject, ObjectId, ObjectKind, Parameter};
use crate::specs;

/// Arena owning every object created for one translation run.
///
/// Objects are never freed individually; dropping a reference from the run is enough to
/// keep an object out of the serialised output.
#[derive(Debug, Default, Clone)]
pub struct BeastGraph {
    objects: Vec<BeastObject>,
}

impl BeastGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: BeastObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn get(&self, id: ObjectId) -> &BeastObject {
        &self.objects[id.0]
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut BeastObject {
        &mut self.objects[id.0]
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &BeastObject)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// The id of an object, or `""` for anonymous objects.
    pub fn id_of(&self, id: ObjectId) -> &str {
        self.get(id).id().unwrap_or_default()
    }

    pub fn real_parameter(&mut self, id: Option<&str>, values: Vec<f64>) -> ObjectId {
        let object = BeastObject::new(
            specs::REAL_PARAMETER,
            ObjectKind::RealParameter(Parameter::new(values)),
        );
        self.add(with_optional_id(object, id))
    }

    pub fn integer_parameter(&mut self, id: Option<&str>, values: Vec<i64>) -> ObjectId {
        let object = BeastObject::new(
            specs::INTEGER_PARAMETER,
            ObjectKind::IntegerParameter(Parameter::new(values)),
        );
        self.add(with_optional_id(object, id))
    }

    pub fn boolean_parameter(&mut self, id: Option<&str>, values: Vec<bool>) -> ObjectId {
        let object = BeastObject::new(
            specs::BOOLEAN_PARAMETER,
            ObjectKind::BooleanParameter(Parameter::new(values)),
        );
        self.add(with_optional_id(object, id))
    }

    /// A `Prior` of `x` under the parametric distribution `distr`, with id `<x>.prior`.
    pub fn prior(&mut self, distr: ObjectId, x: ObjectId) -> ObjectId {
        let id = format!("{}.prior", self.id_of(x));
        self.add(
            BeastObject::new(specs::PRIOR, ObjectKind::Distribution)
                .with_id(id)
                .with_input("x", x)
                .with_input("distr", distr),
        )
    }

    /// Wraps `param` as state frequencies, labelling its components with `state_names`.
    pub fn frequencies(&mut self, param: ObjectId, state_names: &[&str]) -> ObjectId {
        if let ObjectKind::RealParameter(p) = self.get_mut(param).kind_mut() {
            p.keys = Some(state_names.iter().map(|s| s.to_string()).collect());
        }
        self.add(BeastObject::new(specs::FREQUENCIES, ObjectKind::Plain).with_input("frequencies", param))
    }

    pub fn compound_distribution(&mut self, id: &str, distributions: Vec<ObjectId>) -> ObjectId {
        self.add(
            BeastObject::new(specs::COMPOUND_DISTRIBUTION, ObjectKind::Distribution)
                .with_id(id)
                .with_input("distribution", distributions),
        )
    }

    pub fn taxon(&mut self, id: &str) -> ObjectId {
        self.add(BeastObject::new(specs::TAXON, ObjectKind::Plain).with_id(id))
    }

    /// Turns an integer parameter into a real parameter with the same values and bounds.
    /// The object keeps its handle, so every input already pointing at it stays valid.
    /// Returns `false` when the object is not an integer parameter.
    pub fn integer_to_real(&mut self, param: ObjectId) -> bool {
        let object = self.get_mut(param);
        let ObjectKind::IntegerParameter(p) = object.kind() else {
            return false;
        };
        let mut real = Parameter::new(p.values.iter().map(|v| *v as f64).collect());
        real.lower = p.lower.map(|v| v as f64);
        real.upper = p.upper.map(|v| v as f64);
        real.minor_dimension = p.minor_dimension;
        real.keys = p.keys.clone();
        object.retype(specs::REAL_PARAMETER, ObjectKind::RealParameter(real));
        true
    }

    /// Tightens the bounds of a real or integer parameter. Other objects are left untouched.
    pub fn tighten_bounds(&mut self, param: ObjectId, lower: Option<f64>, upper: Option<f64>) {
        match self.get_mut(param).kind_mut() {
            ObjectKind::RealParameter(p) => {
                if let Some(lower) = lower {
                    p.tighten_lower(lower);
                }
                if let Some(upper) = upper {
                    p.tighten_upper(upper);
                }
            }
            ObjectKind::IntegerParameter(p) => {
                if let Some(lower) = lower {
                    p.tighten_lower(lower.ceil() as i64);
                }
                if let Some(upper) = upper {
                    p.tighten_upper(upper.floor() as i64);
                }
            }
            _ => {}
        }
    }
}

fn with_optional_id(object: BeastObject, id: Option<&str>) -> BeastObject {
    match id {
        Some(id) => object.with_id(id),
        None => object,
    }
}
