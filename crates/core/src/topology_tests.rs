// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

use super::*;

#[test]
fn direct_dependency_is_depends_on() {
    let h1 = SupItemId::new();
    let h2 = SupItemId::new();
    let mut topo = Topology::new();
    topo.add_group(DependencyGroup::new("g").with_dependency(h2, h1, 1));

    assert!(topo.depends_on(h2, h1));
    assert!(!topo.depends_on(h1, h2));
}

#[test]
fn transitive_dependency_across_chain() {
    // H3 -> H4 -> H1 (S2/S3 scenario topology)
    let h1 = SupItemId::new();
    let h4 = SupItemId::new();
    let h3 = SupItemId::new();
    let mut topo = Topology::new();
    topo.add_group(DependencyGroup::new("g").with_dependency(h4, h1, 1).with_dependency(h3, h4, 1));

    assert!(topo.depends_on(h3, h1));
    assert!(topo.depends_on(h3, h4));
    assert!(!topo.depends_on(h1, h3));
    assert_eq!(topo.ancestors_with_distance(h3).get(&h1), Some(&2));
}

#[test]
fn descendants_are_the_reverse_of_ancestors() {
    let h1 = SupItemId::new();
    let h2 = SupItemId::new();
    let mut topo = Topology::new();
    topo.add_group(DependencyGroup::new("g").with_dependency(h2, h1, 1));

    assert!(topo.descendants(h1).contains(&h2));
    assert!(!topo.descendants(h2).contains(&h1));
}

#[test]
fn diamond_topology_both_branches_are_ancestors() {
    // H3 -> H1, H3 -> H2 (S4 diamond scenario)
    let h1 = SupItemId::new();
    let h2 = SupItemId::new();
    let h3 = SupItemId::new();
    let mut topo = Topology::new();
    topo.add_group(DependencyGroup::new("g").with_dependency(h3, h1, 1).with_dependency(h3, h2, 1));

    assert!(topo.depends_on(h3, h1));
    assert!(topo.depends_on(h3, h2));

    let nearest = topo.nearest_ancestors_matching(h3, |_| true);
    assert_eq!(nearest.len(), 2);
    assert!(nearest.contains(&h1));
    assert!(nearest.contains(&h2));
}

#[test]
fn nearest_ancestors_matching_picks_minimal_distance_only() {
    // H3 -> H4 -> H1, and H3 -> H2 directly. H2 is nearer than H1.
    let h1 = SupItemId::new();
    let h2 = SupItemId::new();
    let h3 = SupItemId::new();
    let h4 = SupItemId::new();
    let mut topo = Topology::new();
    topo.add_group(
        DependencyGroup::new("g")
            .with_dependency(h4, h1, 1)
            .with_dependency(h3, h4, 1)
            .with_dependency(h3, h2, 1),
    );

    let nearest = topo.nearest_ancestors_matching(h3, |id| id == h1 || id == h2);
    assert_eq!(nearest, vec![h2]);
}

#[test]
fn no_matching_ancestors_returns_empty() {
    let h1 = SupItemId::new();
    let h2 = SupItemId::new();
    let topo = Topology::new();
    assert!(topo.nearest_ancestors_matching(h1, |id| id == h2).is_empty());
}
