//! Dependency graph for plugin ordering
//!
//! Maintains the directed relation "plugin X requires plugin Y loaded and
//! active first" and derives load/unload orderings from it. Bulk operations
//! (reload-all) use the topological order so no plugin initializes before its
//! dependencies; a cycle fails the whole batch with the offending path
//! reported rather than guessing an order.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, ToolbeltError};

/// Directed dependency graph over plugin ids.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Plugin id -> declared dependency ids, in declaration order.
    dependencies: HashMap<String, Vec<String>>,
    /// Insertion order of nodes, for deterministic traversal.
    order: Vec<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a node and its declared dependencies.
    pub fn insert(&mut self, id: &str, dependencies: &[String]) {
        if !self.dependencies.contains_key(id) {
            self.order.push(id.to_string());
        }
        self.dependencies
            .insert(id.to_string(), dependencies.to_vec());
    }

    /// Remove a node. Edges pointing at it from other nodes are kept: a
    /// dependent's declaration is immutable, its satisfaction is what changes.
    pub fn remove(&mut self, id: &str) {
        self.dependencies.remove(id);
        self.order.retain(|n| n != id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.dependencies.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Ids of nodes that declare a dependency on `id`.
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|n| {
                self.dependencies
                    .get(*n)
                    .map(|deps| deps.iter().any(|d| d == id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Transitive dependents of `id`, ordered so that leaves come first.
    ///
    /// Used by cascade unload: everything returned must be unloaded before
    /// `id` itself.
    pub fn transitive_dependents(&self, id: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut pending = vec![id.to_string()];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            for dep in self.dependents_of(&current) {
                if seen.insert(dep.clone()) {
                    result.push(dep.clone());
                    pending.push(dep);
                }
            }
        }
        // Deeper dependents must come before the plugins they depend on.
        result.reverse();
        result
    }

    /// Topological order: every plugin appears after all of its dependencies.
    ///
    /// Dependencies on ids outside the graph are ignored here; the manager
    /// checks their satisfaction against live state separately. A cycle among
    /// graph nodes fails the whole computation with the cycle path.
    pub fn load_order(&self) -> Result<Vec<String>> {
        let mut state: HashMap<&str, VisitState> = HashMap::new();
        let mut result = Vec::with_capacity(self.order.len());
        let mut path = Vec::new();

        for id in &self.order {
            self.visit(id, &mut state, &mut path, &mut result)?;
        }

        Ok(result)
    }

    /// Reverse topological order: leaves first, roots last. This is the order
    /// in which a bulk unload must proceed.
    pub fn unload_order(&self) -> Result<Vec<String>> {
        let mut order = self.load_order()?;
        order.reverse();
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        id: &'a str,
        state: &mut HashMap<&'a str, VisitState>,
        path: &mut Vec<String>,
        result: &mut Vec<String>,
    ) -> Result<()> {
        match state.get(id) {
            Some(VisitState::Done) => return Ok(()),
            Some(VisitState::InProgress) => {
                // Cycle: report the path from the first occurrence of `id`.
                let start = path.iter().position(|p| p == id).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(id.to_string());
                return Err(ToolbeltError::DependencyCycle(cycle));
            }
            None => {}
        }

        // Dependencies on nodes outside this graph are not ours to order.
        let Some(deps) = self.dependencies.get(id) else {
            return Ok(());
        };

        state.insert(id, VisitState::InProgress);
        path.push(id.to_string());

        for dep in deps {
            self.visit(dep, state, path, result)?;
        }

        path.pop();
        state.insert(id, VisitState::Done);
        result.push(id.to_string());
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (id, deps) in edges {
            let deps: Vec<String> = deps.iter().map(|d| d.to_string()).collect();
            g.insert(id, &deps);
        }
        g
    }

    #[test]
    fn test_load_order_linear_chain() {
        let g = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        assert_eq!(g.load_order().unwrap(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_unload_order_is_reverse() {
        let g = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        assert_eq!(g.unload_order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_order_diamond() {
        let g = graph(&[
            ("top", &["left", "right"]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("base", &[]),
        ]);
        let order = g.load_order().unwrap();
        let pos = |id: &str| order.iter().position(|n| n == id).unwrap();
        assert!(pos("base") < pos("left"));
        assert!(pos("base") < pos("right"));
        assert!(pos("left") < pos("top"));
        assert!(pos("right") < pos("top"));
    }

    #[test]
    fn test_cycle_detected_with_path() {
        let g = graph(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let err = g.load_order().unwrap_err();
        match err {
            ToolbeltError::DependencyCycle(path) => {
                // Path starts and ends on the same node
                assert_eq!(path.first(), path.last());
                assert!(path.len() >= 3);
            }
            other => panic!("expected DependencyCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_cycle() {
        let g = graph(&[("solo", &["solo"])]);
        let err = g.load_order().unwrap_err();
        assert!(matches!(err, ToolbeltError::DependencyCycle(_)));
    }

    #[test]
    fn test_external_dependency_ignored_in_ordering() {
        // "a" depends on "ext" which is not tracked here; ordering still works.
        let g = graph(&[("a", &["ext"])]);
        assert_eq!(g.load_order().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_dependents_of() {
        let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b"])]);
        let deps = g.dependents_of("a");
        assert_eq!(deps, vec!["b", "c"]);
        assert_eq!(g.dependents_of("d"), Vec::<String>::new());
    }

    #[test]
    fn test_transitive_dependents_leaves_first() {
        let g = graph(&[("a", &[]), ("b", &["a"]), ("c", &["b"])]);
        let order = g.transitive_dependents("a");
        assert_eq!(order, vec!["c", "b"]);
    }

    #[test]
    fn test_remove_keeps_dangling_edges() {
        let mut g = graph(&[("a", &[]), ("b", &["a"])]);
        g.remove("a");
        assert!(!g.contains("a"));
        // b still declares a; ordering treats it as external
        assert_eq!(g.load_order().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_insert_replaces_dependencies() {
        let mut g = graph(&[("a", &["b"]), ("b", &[])]);
        g.insert("a", &[]);
        assert_eq!(g.dependents_of("b"), Vec::<String>::new());
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_empty_graph() {
        let g = DependencyGraph::new();
        assert!(g.is_empty());
        assert!(g.load_order().unwrap().is_empty());
    }
}
