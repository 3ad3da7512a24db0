// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Vigil Project Contributors

//! Rule Registry (§4.2): holds declared rules and validates that their
//! `depends_on` edges are acyclic, then builds the fixed execution DAG the
//! Executor materializes a run instance from on every message.

use crate::Rule;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("rule {0:?} registered twice")]
    DuplicateRule(String),
    #[error("rule {0:?} depends on unknown rule {1:?}")]
    UnknownDependency(String, String),
    #[error("dependency cycle detected involving rule {0:?}")]
    Cycle(String),
}

/// Declared rules plus the dependency edges between them, forming a DAG
/// with a virtual start node (no parents) and a virtual end node (fires
/// only once every rule has completed or failed, §4.2).
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    index_by_name: HashMap<String, usize>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new(), index_by_name: HashMap::new() }
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) -> Result<(), RegistryError> {
        let name = rule.name().to_string();
        if self.index_by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateRule(name));
        }
        let idx = self.rules.len();
        self.index_by_name.insert(name, idx);
        self.rules.push(rule);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.index_by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.index_by_name.get(name).map(|&idx| &self.rules[idx])
    }

    /// Validate dependency edges and compute a topological execution order
    /// (§4.2). The returned order respects `depends_on`: every rule appears
    /// after all the rules it depends on.
    pub fn build_dag(&self) -> Result<RuleDag, RegistryError> {
        for rule in &self.rules {
            for dep in rule.depends_on() {
                if !self.index_by_name.contains_key(dep) {
                    return Err(RegistryError::UnknownDependency(
                        rule.name().to_string(),
                        dep.clone(),
                    ));
                }
            }
        }

        let n = self.rules.len();
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (idx, rule) in self.rules.iter().enumerate() {
            for dep in rule.depends_on() {
                parents[idx].push(self.index_by_name[dep]);
            }
        }

        let order = topological_order(&parents, |idx| self.rules[idx].name().to_string())?;

        Ok(RuleDag { rules: self.rules.clone(), parents, order })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

fn topological_order(
    parents: &[Vec<usize>],
    name_of: impl Fn(usize) -> String,
) -> Result<Vec<usize>, RegistryError> {
    let n = parents.len();
    let mut state = vec![VisitState::Unvisited; n];
    let mut order = Vec::with_capacity(n);

    fn visit(
        idx: usize,
        parents: &[Vec<usize>],
        state: &mut [VisitState],
        order: &mut Vec<usize>,
        name_of: &impl Fn(usize) -> String,
    ) -> Result<(), RegistryError> {
        match state[idx] {
            VisitState::Done => return Ok(()),
            VisitState::InProgress => return Err(RegistryError::Cycle(name_of(idx))),
            VisitState::Unvisited => {}
        }
        state[idx] = VisitState::InProgress;
        for &parent in &parents[idx] {
            visit(parent, parents, state, order, name_of)?;
        }
        state[idx] = VisitState::Done;
        order.push(idx);
        Ok(())
    }

    for idx in 0..n {
        visit(idx, parents, &mut state, &mut order, &name_of)?;
    }
    Ok(order)
}

/// The fixed execution DAG computed once at registry build time (§4.2). A
/// per-message run instance (`vigil-engine`'s Executor) walks `order`,
/// waiting for each rule's `parents` to finish before firing it.
#[derive(Clone)]
pub struct RuleDag {
    rules: Vec<Arc<dyn Rule>>,
    parents: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl RuleDag {
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_at(&self, idx: usize) -> &Arc<dyn Rule> {
        &self.rules[idx]
    }

    pub fn parents_of(&self, idx: usize) -> &[usize] {
        &self.parents[idx]
    }

    /// Topological execution order: a rule's index never appears before any
    /// of its `parents_of`.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name() == name)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
