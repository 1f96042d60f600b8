// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Serialisation of an object graph to BEAST 2 XML.
//!
//! Each object is written in full at its first reference, nested under the element of
//! the object that references it, and as `<input idref="..."/>` at every later
//! reference. Only objects reachable from the run are written.

use crate::graph::BeastGraph;
use crate::object::{Input, ObjectId};
use crate::specs::short_name;
use crate::writer::XmlWriter;
use std::collections::{HashMap, HashSet};

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;
const BEAST_VERSION: &str = "2.6";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("id `{0}` is used by two different objects")]
    DuplicateId(String),
}

pub struct XmlProducer<'a> {
    graph: &'a BeastGraph,
    ids: HashMap<ObjectId, String>,
}

impl<'a> XmlProducer<'a> {
    pub fn new(graph: &'a BeastGraph) -> Self {
        Self {
            graph,
            ids: HashMap::new(),
        }
    }

    /// Produce the XML document with `run` as the `<run>` element.
    pub fn to_xml(mut self, run: ObjectId) -> Result<String, XmlError> {
        let reachable = self.reachable(run);
        self.assign_ids(&reachable)?;
        log::debug!("writing {} of {} objects", reachable.len(), self.graph.len());

        let mut w = XmlWriter::new();
        w.line(XML_HEADER);
        w.line(&format!("<beast version=\"{}\">", BEAST_VERSION));
        w.indent();
        self.write_elements(&mut w, run);
        w.dedent();
        w.close_tag("beast");
        Ok(w.into_inner())
    }

    /// Objects reachable from `root` in document order.
    fn reachable(&self, root: ObjectId) -> Vec<ObjectId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            let children: Vec<ObjectId> = self.graph.get(id).references().collect();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    fn assign_ids(&mut self, reachable: &[ObjectId]) -> Result<(), XmlError> {
        let graph = self.graph;
        let mut taken: HashSet<String> = HashSet::new();
        for &id in reachable {
            if let Some(name) = graph.get(id).id() {
                if !taken.insert(name.to_string()) {
                    return Err(XmlError::DuplicateId(name.to_string()));
                }
                self.ids.insert(id, name.to_string());
            }
        }

        let mut counters: HashMap<&str, usize> = HashMap::new();
        for &id in reachable {
            if self.ids.contains_key(&id) {
                continue;
            }
            let short = short_name(graph.get(id).spec());
            let counter = counters.entry(short).or_insert(0);
            let name = loop {
                let candidate = format!("{}.{}", short, counter);
                *counter += 1;
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(name.clone());
            self.ids.insert(id, name);
        }
        Ok(())
    }

    fn write_elements(&self, w: &mut XmlWriter, run: ObjectId) {
        enum Step<'s> {
            Element(&'s str, ObjectId),
            End(&'s str),
        }

        let mut written: HashSet<ObjectId> = HashSet::new();
        let mut stack = vec![Step::Element("run", run)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Element(name, id) if written.contains(&id) => {
                    w.open_tag(name, [("idref", self.ids[&id].as_str())]);
                    w.line("/>");
                }
                Step::Element(name, id) => {
                    written.insert(id);
                    let object = self.graph.get(id);
                    let mut attributes: Vec<(&str, String)> = vec![
                        ("id", self.ids[&id].clone()),
                        ("spec", object.spec().to_string()),
                    ];
                    let mut children: Vec<(&str, ObjectId)> = Vec::new();
                    for (input, value) in object.inputs() {
                        match value {
                            Input::Value(primitive) => attributes.push((input, primitive.to_string())),
                            Input::Object(child) => children.push((input, *child)),
                            Input::Objects(list) => children.extend(list.iter().map(|c| (input, *c))),
                        }
                    }
                    attributes.extend(object.payload_attributes());

                    w.open_tag(name, attributes.iter().map(|(k, v)| (*k, v.as_str())));
                    if children.is_empty() {
                        w.line("/>");
                        continue;
                    }
                    w.line(">");
                    w.indent();
                    stack.push(Step::End(name));
                    stack.extend(
                        children
                            .into_iter()
                            .rev()
                            .map(|(input, child)| Step::Element(input, child)),
                    );
                }
                Step::End(name) => {
                    w.dedent();
                    w.close_tag(name);
                }
            }
        }
    }
}

/// Serialise the objects reachable from `run`.
pub fn to_xml(graph: &BeastGraph, run: ObjectId) -> Result<String, XmlError> {
    XmlProducer::new(graph).to_xml(run)
}
