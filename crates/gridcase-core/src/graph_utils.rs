use crate::error::CaseResult;
use crate::{BusId, Case};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use std::collections::VecDeque;

/// Degree and component statistics over the in-service topology.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// One electrically connected group of buses.
#[derive(Debug, Clone, Serialize)]
pub struct IslandSummary {
    pub island_id: usize,
    /// Member buses in case insertion order
    pub buses: Vec<BusId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    /// Island id of every bus, indexed by bus position
    pub assignments: Vec<usize>,
}

impl IslandAnalysis {
    pub fn island_count(&self) -> usize {
        self.islands.len()
    }

    /// Island of the bus at `position` in [`Case::connected_buses`].
    pub fn island_of(&self, position: usize) -> Option<usize> {
        self.assignments.get(position).copied()
    }
}

/// Undirected graph of the in-service topology. Node weights are bus
/// positions, edge weights are branch positions. Node `i` is bus position `i`.
///
/// Fails with the first integrity error when the case does not validate:
/// a dangling endpoint has no node to attach to, and a duplicated bus id
/// would leave its second bus as a node no branch can reach.
pub fn build_graph(case: &Case) -> CaseResult<UnGraph<usize, usize>> {
    if let Some(err) = case.integrity_errors().into_iter().next() {
        return Err(err);
    }
    let buses = case.connected_buses();
    let mut graph: UnGraph<usize, usize> =
        UnGraph::with_capacity(buses.len(), case.branches().len());
    for position in 0..buses.len() {
        graph.add_node(position);
    }
    for (position, branch) in case.branches().iter().enumerate() {
        if !branch.in_service {
            continue;
        }
        let from = case.bus_position(branch.from_bus)?;
        let to = case.bus_position(branch.to_bus)?;
        graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), position);
    }
    Ok(graph)
}

/// Density, degree distribution and component count of the case topology.
pub fn graph_stats(case: &Case) -> CaseResult<GraphStats> {
    let graph = build_graph(case)?;
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let degrees: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.edges(node).count())
        .collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    Ok(GraphStats {
        node_count,
        edge_count,
        connected_components: connected_components(&graph),
        min_degree,
        avg_degree,
        max_degree,
        density,
    })
}

/// Label connected components by breadth-first search from each bus in
/// insertion order, so island 0 always contains the first bus.
pub fn find_islands(case: &Case) -> CaseResult<IslandAnalysis> {
    let graph = build_graph(case)?;
    let buses = case.connected_buses();
    let mut assignments = vec![usize::MAX; buses.len()];
    let mut islands = Vec::new();

    for start in graph.node_indices() {
        if assignments[start.index()] != usize::MAX {
            continue;
        }
        let island_id = islands.len();
        let mut members = Vec::new();
        let mut queue = VecDeque::from([start]);
        assignments[start.index()] = island_id;
        while let Some(node) = queue.pop_front() {
            members.push(node.index());
            for neighbor in graph.neighbors(node) {
                if assignments[neighbor.index()] == usize::MAX {
                    assignments[neighbor.index()] = island_id;
                    queue.push_back(neighbor);
                }
            }
        }
        members.sort_unstable();
        islands.push(IslandSummary {
            island_id,
            buses: members.into_iter().map(|p| buses[p].id).collect(),
        });
    }

    tracing::debug!(case = %case.name, islands = islands.len(), "island analysis");
    Ok(IslandAnalysis {
        islands,
        assignments,
    })
}
