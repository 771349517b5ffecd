use crate::error::{BuildError, BuildResult};
use common::config::components::resources::ResourceConfigs;
use petgraph::algo::{is_cyclic_directed, kosaraju_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Upstream lineage between declared resources, built from their `data_from`
/// references. Edges point upstream to downstream.
#[derive(Debug)]
pub struct LineageGraph {
    graph: DiGraph<String, ()>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl LineageGraph {
    /// Build and validate the lineage for a set of resources. A `data_from`
    /// reference to an undeclared resource is a fatal lookup error; a cycle
    /// anywhere in the chain is fatal and reports the cycle membership.
    pub fn build(resources: &ResourceConfigs) -> BuildResult<Self> {
        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();

        let mut names: Vec<&String> = resources.keys().collect();
        names.sort();
        for name in &names {
            let idx = graph.add_node((*name).clone());
            name_to_index.insert((*name).clone(), idx);
        }

        for name in names {
            let resource = &resources[name];
            if let Some(upstream) = &resource.data_from {
                let Some(&from_idx) = name_to_index.get(upstream) else {
                    return Err(BuildError::unknown_upstream(name, upstream));
                };
                let to_idx = name_to_index[name];
                graph.add_edge(from_idx, to_idx, ());
            }
        }

        let lineage = Self {
            graph,
            name_to_index,
        };
        lineage.check_acyclic()?;
        Ok(lineage)
    }

    fn check_acyclic(&self) -> BuildResult<()> {
        if is_cyclic_directed(&self.graph) {
            if let Some(cycle) = kosaraju_scc(&self.graph).into_iter().find(|c| c.len() > 1) {
                let mut members: Vec<String> = cycle
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect();
                members.sort();
                return Err(BuildError::CycleDetected(members));
            }
            // Self-referencing resource: SCC of size one with a loop edge.
            for idx in self.graph.node_indices() {
                if self.graph.find_edge(idx, idx).is_some() {
                    return Err(BuildError::CycleDetected(vec![self.graph[idx].clone()]));
                }
            }
        }
        Ok(())
    }

    /// Walk a resource's `data_from` chain to its terminal ancestor. Returns
    /// `None` for resources with no upstream. Chain depth is unbounded; the
    /// build-time cycle check guarantees termination.
    pub fn terminal_ancestor(&self, name: &str) -> Option<&str> {
        let mut current = self.name_to_index.get(name).copied()?;
        let mut moved = false;
        while let Some(parent) = self
            .graph
            .neighbors_directed(current, petgraph::Direction::Incoming)
            .next()
        {
            current = parent;
            moved = true;
        }
        moved.then(|| self.graph[current].as_str())
    }

    pub fn has_upstream(&self, name: &str) -> bool {
        self.name_to_index
            .get(name)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .next()
                    .is_some()
            })
            .unwrap_or(false)
    }

    /// DOT rendering of the lineage, for terminal debugging and the CLI
    /// `graph` command.
    pub fn to_dot_string(&self) -> String {
        let mut dot = String::new();
        writeln!(dot, "digraph {{").unwrap();
        writeln!(dot, "    rankdir=LR;").unwrap();

        for idx in self.graph.node_indices() {
            writeln!(dot, "    {} [label=\"{}\"];", idx.index(), self.graph[idx]).unwrap();
        }
        for edge in self.graph.raw_edges() {
            writeln!(
                dot,
                "    {} -> {};",
                edge.source().index(),
                edge.target().index()
            )
            .unwrap();
        }
        writeln!(dot, "}}").unwrap();

        dot
    }
}
