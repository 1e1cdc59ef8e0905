//! Call graph module
//!
//! A directed graph of call-site edges between program methods, built during
//! whole-program analysis and cloned out of the engine before reset.

use crate::ir::MethodRef;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

/// Identity of one call site: which statement of which caller issued the call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub caller: MethodRef,
    /// Statement index within the caller's body
    pub statement: u32,
    pub line: Option<u32>,
}

/// Whole-program call graph with call-site identity on every edge
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    graph: DiGraph<MethodRef, CallSite>,
    nodes: HashMap<MethodRef, NodeIndex>,
}

impl CallGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, method: &MethodRef) -> NodeIndex {
        if let Some(&index) = self.nodes.get(method) {
            return index;
        }
        let index = self.graph.add_node(method.clone());
        self.nodes.insert(method.clone(), index);
        index
    }

    /// Record one call-site edge from `caller` to `callee`
    pub(crate) fn add_call(&mut self, caller: MethodRef, callee: MethodRef, site: CallSite) {
        let from = self.ensure_node(&caller);
        let to = self.ensure_node(&callee);
        self.graph.add_edge(from, to, site);
    }

    /// Get the underlying graph
    pub fn graph(&self) -> &DiGraph<MethodRef, CallSite> {
        &self.graph
    }

    /// Whether any call site connects `from` to `to`
    pub fn contains_edge(&self, from: &MethodRef, to: &MethodRef) -> bool {
        match (self.nodes.get(from), self.nodes.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Methods called from `from`, one entry per call site
    pub fn callees_of(&self, from: &MethodRef) -> Vec<&MethodRef> {
        match self.nodes.get(from) {
            Some(&index) => self
                .graph
                .edges(index)
                .map(|edge| &self.graph[edge.target()])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Iterate over all edges as (caller, callee, call site)
    pub fn edges(&self) -> impl Iterator<Item = (&MethodRef, &MethodRef, &CallSite)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                edge.weight(),
            )
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Export the call graph to DOT format for visualization
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph callgraph {\n");
        for index in self.graph.node_indices() {
            dot.push_str(&format!("    \"{}\";\n", self.graph[index]));
        }
        for edge in self.graph.edge_references() {
            let site = edge.weight();
            dot.push_str(&format!(
                "    \"{}\" -> \"{}\" [label=\"stmt {}\"];\n",
                self.graph[edge.source()],
                self.graph[edge.target()],
                site.statement
            ));
        }
        dot.push_str("}\n");
        dot
    }
}
