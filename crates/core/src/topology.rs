// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! The platform's dependency topology: a directed graph of `Dependency`
//! edges grouped into `DependencyGroup`s, each edge carrying a distance
//! (§3). Queried read-only by the Correvent Manager and by rules.
//!
//! An edge `from -> to` means "`from` depends on `to`" — `to` is upstream
//! of `from`. A raw event on `from`'s SupItem is a member of a correvent
//! rooted at `to` iff `from` is transitively dependent on `to` (§3).

use crate::supitem::SupItemId;
use serde::{Deserialize, Serialize};
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A single dependency edge: `from` depends on `to`, `distance` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub from: SupItemId,
    pub to: SupItemId,
    pub distance: u32,
}

/// A named collection of dependency edges (e.g. one per topology source).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGroup {
    pub name: String,
    pub dependencies: Vec<Dependency>,
}

impl DependencyGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), dependencies: Vec::new() }
    }

    pub fn with_dependency(mut self, from: SupItemId, to: SupItemId, distance: u32) -> Self {
        self.dependencies.push(Dependency { from, to, distance });
        self
    }
}

/// The full dependency graph, read-only once loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    groups: Vec<DependencyGroup>,
}

#[derive(PartialEq, Eq)]
struct HeapEntry {
    distance: u32,
    item: SupItemId,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (a max-heap) acts as a min-heap on distance.
        other.distance.cmp(&self.distance)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, group: DependencyGroup) {
        self.groups.push(group);
    }

    fn forward_adjacency(&self) -> HashMap<SupItemId, Vec<(SupItemId, u32)>> {
        let mut adj: HashMap<SupItemId, Vec<(SupItemId, u32)>> = HashMap::new();
        for group in &self.groups {
            for dep in &group.dependencies {
                adj.entry(dep.from).or_default().push((dep.to, dep.distance));
            }
        }
        adj
    }

    fn reverse_adjacency(&self) -> HashMap<SupItemId, Vec<(SupItemId, u32)>> {
        let mut adj: HashMap<SupItemId, Vec<(SupItemId, u32)>> = HashMap::new();
        for group in &self.groups {
            for dep in &group.dependencies {
                adj.entry(dep.to).or_default().push((dep.from, dep.distance));
            }
        }
        adj
    }

    /// Items `item` directly depends on, with their edge distance.
    pub fn direct_dependencies(&self, item: SupItemId) -> Vec<(SupItemId, u32)> {
        self.forward_adjacency().remove(&item).unwrap_or_default()
    }

    /// Shortest cumulative distance from `item` to every item it transitively
    /// depends on ("ancestors" in the causal sense: upstream, precedes
    /// `item`).
    pub fn ancestors_with_distance(&self, item: SupItemId) -> HashMap<SupItemId, u32> {
        self.shortest_distances(item, &self.forward_adjacency())
    }

    /// Items that transitively depend on `item` (downstream, succeeds
    /// `item`), with their shortest cumulative distance.
    pub fn descendants_with_distance(&self, item: SupItemId) -> HashMap<SupItemId, u32> {
        self.shortest_distances(item, &self.reverse_adjacency())
    }

    pub fn descendants(&self, item: SupItemId) -> HashSet<SupItemId> {
        self.descendants_with_distance(item).into_keys().collect()
    }

    fn shortest_distances(
        &self,
        source: SupItemId,
        adjacency: &HashMap<SupItemId, Vec<(SupItemId, u32)>>,
    ) -> HashMap<SupItemId, u32> {
        let mut dist: HashMap<SupItemId, u32> = HashMap::new();
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry { distance: 0, item: source });

        while let Some(HeapEntry { distance, item }) = heap.pop() {
            if let Some(&best) = dist.get(&item) {
                if best <= distance {
                    continue;
                }
            }
            if item != source {
                dist.insert(item, distance);
            }
            if let Some(edges) = adjacency.get(&item) {
                for &(next, edge_distance) in edges {
                    let next_distance = distance + edge_distance;
                    let better = dist.get(&next).map_or(true, |&d| next_distance < d);
                    if better {
                        heap.push(HeapEntry { distance: next_distance, item: next });
                    }
                }
            }
        }
        dist
    }

    /// Whether `item` transitively depends on `ancestor` (per the edge
    /// direction documented above).
    pub fn depends_on(&self, item: SupItemId, ancestor: SupItemId) -> bool {
        self.ancestors_with_distance(item).contains_key(&ancestor)
    }

    /// Among `item`'s ancestors satisfying `pred`, the ones at minimal
    /// distance. Used by desaggregation to find the nearest still-problematic
    /// ancestor to re-home a freed member onto (§4.6).
    pub fn nearest_ancestors_matching(
        &self,
        item: SupItemId,
        mut pred: impl FnMut(SupItemId) -> bool,
    ) -> Vec<SupItemId> {
        let ancestors = self.ancestors_with_distance(item);
        let matching: Vec<(SupItemId, u32)> =
            ancestors.into_iter().filter(|(id, _)| pred(*id)).collect();
        let Some(&min_distance) = matching.iter().map(|(_, d)| d).min() else {
            return Vec::new();
        };
        matching.into_iter().filter(|(_, d)| *d == min_distance).map(|(id, _)| id).collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;

    /// Build a linear chain `items[0] -> items[1] -> ... -> items[n-1]`
    /// (each depends on the next), distance 1 per edge.
    pub fn chain(items: &[SupItemId]) -> Topology {
        let mut topology = Topology::new();
        let mut group = DependencyGroup::new("chain");
        for pair in items.windows(2) {
            group = group.with_dependency(pair[0], pair[1], 1);
        }
        topology.add_group(group);
        topology
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;
