// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! BEAST 2 object graph: an arena of typed objects wired through named inputs, and the
//! producer of the XML format BEAST reads.

mod escape;
mod graph;
mod object;
pub mod specs;
mod writer;
mod xml;

pub use graph::BeastGraph;
pub use object::{BeastObject, Input, ObjectId, ObjectKind, Parameter, Primitive, TreeShape};
pub use xml::{to_xml, XmlError, XmlProducer};
