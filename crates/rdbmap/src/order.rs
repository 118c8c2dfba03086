//! Table ordering for foreign-key safe writes.
//!
//! Parents are inserted before their children and deleted after them. The
//! order is a topological sort (Kahn) over the relationship graph, seeded in
//! first-appearance order so equal inputs always give equal output.

use crate::error::{OrmError, OrmResult};
use crate::mapping::Mapping;
use std::collections::{HashMap, HashSet, VecDeque};

/// Tables named by the relationships, parent before child within each
/// relationship, relationships in registration order. Keyed case-insensitively;
/// the first spelling seen is kept.
struct Graph {
    names: Vec<String>,
    children: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl Graph {
    fn build(mapping: &Mapping) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut graph = Graph {
            names: Vec::new(),
            children: Vec::new(),
            in_degree: Vec::new(),
        };
        let mut edges: HashSet<(usize, usize)> = HashSet::new();

        for r in mapping.relationships() {
            let parent = graph.node(&mut index, &r.parent_table);
            let child = graph.node(&mut index, &r.child_table);

            // Self references do not constrain the order.
            if parent == child || !edges.insert((parent, child)) {
                continue;
            }
            graph.children[parent].push(child);
            graph.in_degree[child] += 1;
        }

        graph
    }

    fn node(&mut self, index: &mut HashMap<String, usize>, name: &str) -> usize {
        *index.entry(name.to_ascii_lowercase()).or_insert_with(|| {
            self.names.push(name.to_string());
            self.children.push(Vec::new());
            self.in_degree.push(0);
            self.names.len() - 1
        })
    }

    fn sort(mut self) -> OrmResult<Vec<String>> {
        let mut ready: VecDeque<usize> = (0..self.names.len())
            .filter(|&n| self.in_degree[n] == 0)
            .collect();
        let mut placed = vec![false; self.names.len()];
        let mut order = Vec::with_capacity(self.names.len());

        while let Some(n) = ready.pop_front() {
            placed[n] = true;
            order.push(n);
            for &child in &self.children[n] {
                self.in_degree[child] -= 1;
                if self.in_degree[child] == 0 {
                    ready.push_back(child);
                }
            }
        }

        if order.len() < self.names.len() {
            let tables: Vec<String> = (0..self.names.len())
                .filter(|&n| !placed[n])
                .map(|n| self.names[n].clone())
                .collect();
            tracing::warn!(tables = ?tables, "Relationship graph has a cycle");
            return Err(OrmError::CycleDetected { tables });
        }

        Ok(order.into_iter().map(|n| self.names[n].clone()).collect())
    }
}

impl Mapping {
    /// Tables taking part in a relationship, every parent before its
    /// children. Tables without relationships are not listed; see
    /// [`Mapping::full_insert_order`].
    pub fn insert_order(&self) -> OrmResult<Vec<String>> {
        let order = Graph::build(self).sort()?;
        tracing::debug!(order = ?order, "Computed insert order");
        Ok(order)
    }

    /// The exact reverse of [`Mapping::insert_order`].
    pub fn delete_order(&self) -> OrmResult<Vec<String>> {
        let mut order = self.insert_order()?;
        order.reverse();
        Ok(order)
    }

    /// [`Mapping::insert_order`] followed by every other registered table in
    /// registration order.
    pub fn full_insert_order(&self) -> OrmResult<Vec<String>> {
        let mut order = self.insert_order()?;
        let mut seen: HashSet<String> = order.iter().map(|t| t.to_ascii_lowercase()).collect();
        for table in self.tables() {
            if seen.insert(table.name.to_ascii_lowercase()) {
                order.push(table.name.clone());
            }
        }
        Ok(order)
    }
}
