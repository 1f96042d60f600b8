// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Model Graph
//!
//! The probabilistic model graph handed to the BEAST translator: typed values, the
//! generators (functions and generative distributions) that produced them, and the
//! per-context (data vs model) identifier dictionaries. This crate does not know
//! anything about the target inference engine.

mod alignment;
pub mod document;
mod graph;
mod tree;
mod value;

pub use alignment::Alignment;
pub use document::{load_model, DocumentError, ModelDocument};
pub use graph::{
    Context, GeneratorCategory, GeneratorId, GeneratorKind, GeneratorNode, GraphError,
    ModelGraph, NodeRef, ValueId, ValueNode,
};
pub use tree::{NewickError, TimeTree, TreeNode};
pub use value::{TypeTag, Value, ValueType};
