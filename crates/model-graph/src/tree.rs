// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Time trees and a small Newick reader.
//!
//! Node heights are measured backwards from the most recent tip, so the deepest tip
//! has height zero and the root carries the largest height. Parsing and printing use
//! explicit stacks; caterpillar trees with thousands of tips are common.

use itertools::Itertools;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub label: Option<String>,
    pub height: f64,
    pub branch_length: f64,
    pub children: Vec<usize>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeTree {
    nodes: Vec<TreeNode>,
    root: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum NewickError {
    #[error("unexpected `{found}` at offset {offset} in newick string")]
    Unexpected { found: char, offset: usize },
    #[error("invalid branch length `{0}`")]
    BranchLength(String),
    #[error("unbalanced parentheses in newick string")]
    Unbalanced,
    #[error("empty newick string")]
    Empty,
}

impl TimeTree {
    pub fn from_newick(newick: &str) -> Result<Self, NewickError> {
        let chars: Vec<char> = newick.chars().collect();
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut last: Option<usize> = None;
        let mut root: Option<usize> = None;

        let new_node = |nodes: &mut Vec<TreeNode>| {
            nodes.push(TreeNode {
                label: None,
                height: 0.0,
                branch_length: 0.0,
                children: Vec::new(),
            });
            nodes.len() - 1
        };

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match c {
                '(' => {
                    let node = new_node(&mut nodes);
                    if let Some(&parent) = open.last() {
                        nodes[parent].children.push(node);
                    } else if root.is_some() {
                        return Err(NewickError::Unexpected { found: c, offset: i });
                    }
                    open.push(node);
                    last = None;
                    i += 1;
                }
                ',' => {
                    if open.is_empty() {
                        return Err(NewickError::Unexpected { found: c, offset: i });
                    }
                    last = None;
                    i += 1;
                }
                ')' => {
                    let node = open.pop().ok_or(NewickError::Unbalanced)?;
                    if open.is_empty() {
                        root = Some(node);
                    }
                    last = Some(node);
                    i += 1;
                }
                ':' => {
                    let node = last.ok_or(NewickError::Unexpected { found: c, offset: i })?;
                    let start = i + 1;
                    i = start;
                    while i < chars.len() && !"(),:;".contains(chars[i]) && !chars[i].is_whitespace()
                    {
                        i += 1;
                    }
                    let text: String = chars[start..i].iter().collect();
                    nodes[node].branch_length = text
                        .parse()
                        .map_err(|_| NewickError::BranchLength(text.clone()))?;
                }
                ';' => break,
                c if c.is_whitespace() => i += 1,
                _ => {
                    let (label, next) = read_label(&chars, i);
                    i = next;
                    match last {
                        Some(node) => nodes[node].label = Some(label),
                        None => {
                            let leaf = new_node(&mut nodes);
                            nodes[leaf].label = Some(label);
                            match open.last() {
                                Some(&parent) => nodes[parent].children.push(leaf),
                                None if root.is_none() => root = Some(leaf),
                                None => {
                                    return Err(NewickError::Unexpected { found: c, offset: i })
                                }
                            }
                            last = Some(leaf);
                        }
                    }
                }
            }
        }

        if !open.is_empty() {
            return Err(NewickError::Unbalanced);
        }
        let root = root.ok_or(NewickError::Empty)?;
        let mut tree = TimeTree { nodes, root };
        tree.assign_heights();
        Ok(tree)
    }

    fn assign_heights(&mut self) {
        let mut depth = vec![0.0; self.nodes.len()];
        let mut stack = vec![self.root];
        let mut max_depth: f64 = 0.0;
        while let Some(node) = stack.pop() {
            for &child in &self.nodes[node].children {
                depth[child] = depth[node] + self.nodes[child].branch_length;
                stack.push(child);
            }
            if self.nodes[node].is_leaf() {
                max_depth = max_depth.max(depth[node]);
            }
        }
        for (node, d) in self.nodes.iter_mut().zip(depth) {
            node.height = max_depth - d;
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[self.root]
    }

    pub fn root_height(&self) -> f64 {
        self.root().height
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn internal_node_count(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    /// Tip labels in left-to-right order.
    pub fn taxa(&self) -> Vec<&str> {
        let mut taxa = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let node = &self.nodes[node];
            if node.is_leaf() {
                taxa.extend(node.label.as_deref());
            }
            stack.extend(node.children.iter().rev());
        }
        taxa
    }

    pub fn to_newick(&self) -> String {
        enum Step {
            Enter(usize),
            Separator,
            Close(usize),
        }

        let mut out = String::new();
        let mut stack = vec![Step::Enter(self.root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(node) if self.nodes[node].is_leaf() => self.write_suffix(&mut out, node),
                Step::Enter(node) => {
                    out.push('(');
                    stack.push(Step::Close(node));
                    for (i, &child) in self.nodes[node].children.iter().enumerate().rev() {
                        stack.push(Step::Enter(child));
                        if i > 0 {
                            stack.push(Step::Separator);
                        }
                    }
                }
                Step::Separator => out.push(','),
                Step::Close(node) => {
                    out.push(')');
                    self.write_suffix(&mut out, node);
                }
            }
        }
        out.push(';');
        out
    }

    fn write_suffix(&self, out: &mut String, node: usize) {
        let tree_node = &self.nodes[node];
        if let Some(label) = &tree_node.label {
            out.push_str(label);
        }
        if node != self.root {
            let _ = write!(out, ":{:?}", tree_node.branch_length);
        }
    }

    /// Space-separated tip labels, the form BEAST uses for taxon lists.
    pub fn taxa_string(&self) -> String {
        self.taxa().iter().join(" ")
    }
}

fn read_label(chars: &[char], start: usize) -> (String, usize) {
    if chars[start] == '\'' {
        let mut i = start + 1;
        let mut label = String::new();
        while i < chars.len() && chars[i] != '\'' {
            label.push(chars[i]);
            i += 1;
        }
        return (label, (i + 1).min(chars.len()));
    }
    let mut i = start;
    while i < chars.len() && !"(),:;".contains(chars[i]) && !chars[i].is_whitespace() {
        i += 1;
    }
    (chars[start..i].iter().collect(), i)
}
