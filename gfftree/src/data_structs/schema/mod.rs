//! Runtime-extensible type ontology.
//!
//! A [`TypeSchema`] is a DAG of type nodes. Every node owns a set of exact
//! names (a canonical name followed by its synonyms) and a set of rough
//! synonyms, and points at the nodes it is part of. Is-a relations share the
//! part-of edge set, so `is_a` and `part_of` answer the same reachability
//! question.
//!
//! Names map many-to-one onto nodes through a registry. A name registered on
//! more than one node is ambiguous: queries consider every candidate, edits
//! refuse to guess.
//!
//! All queries walk the ancestor closure from scratch. Schemas are small and
//! edits are rare, so there is no memoization to invalidate.

mod seed;

use std::fmt::Write;

use hashbrown::HashMap;
use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;
pub use seed::CDS_TYPE;
use smallvec::SmallVec;

use crate::error::{
    FeatureTreeError,
    Result,
};

type NodeIdx = usize;
type Candidates = SmallVec<[NodeIdx; 1]>;

#[derive(Debug, Clone)]
struct TypeNode {
    names:       IndexSet<String>,
    rough_names: IndexSet<String>,
    part_of:     IndexSet<NodeIdx>,
}

impl TypeNode {
    fn canonical(&self) -> &str {
        self.names
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct TypeSchema {
    nodes: Vec<TypeNode>,
    exact: HashMap<String, Candidates>,
    rough: HashMap<String, Candidates>,
}

impl Default for TypeSchema {
    /// Schema preloaded with the built-in ontology.
    fn default() -> Self {
        let mut schema = Self::empty();
        for (name, exact, rough, part_of) in seed::SEED_TYPES {
            schema
                .define_type(name, exact, rough, &[], part_of)
                .expect("built-in ontology is consistent");
        }
        schema
    }
}

impl TypeSchema {
    /// Schema with no types at all.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            exact: HashMap::new(),
            rough: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn candidates(
        &self,
        name: &str,
    ) -> &[NodeIdx] {
        self.exact
            .get(name)
            .map(SmallVec::as_slice)
            .unwrap_or_default()
    }

    fn rough_candidates(
        &self,
        name: &str,
    ) -> impl Iterator<Item = NodeIdx> + '_ {
        let rough = self
            .rough
            .get(name)
            .map(SmallVec::as_slice)
            .unwrap_or_default();
        self.candidates(name)
            .iter()
            .chain(rough.iter())
            .copied()
            .unique()
    }

    /// Resolves `name` to exactly one node.
    fn resolve(
        &self,
        name: &str,
    ) -> Result<NodeIdx> {
        match self.candidates(name) {
            [] => {
                Err(FeatureTreeError::NotInOntology {
                    type_name: name.to_string(),
                })
            },
            [single] => Ok(*single),
            many => {
                Err(FeatureTreeError::AmbiguousType {
                    name:       name.to_string(),
                    candidates: many
                        .iter()
                        .map(|idx| self.nodes[*idx].canonical().to_string())
                        .collect(),
                })
            },
        }
    }

    fn register(
        &mut self,
        node: NodeIdx,
        name: &str,
    ) {
        let candidates = self.exact.entry(name.to_string()).or_default();
        if !candidates.contains(&node) {
            candidates.push(node);
        }
        self.nodes[node].names.insert(name.to_string());
    }

    fn register_rough(
        &mut self,
        node: NodeIdx,
        name: &str,
    ) {
        let candidates = self.rough.entry(name.to_string()).or_default();
        if !candidates.contains(&node) {
            candidates.push(node);
        }
        self.nodes[node].rough_names.insert(name.to_string());
    }

    /// True if any node in `targets` is reachable from `from` by following
    /// at least one edge.
    fn reaches(
        &self,
        from: &[NodeIdx],
        targets: &[NodeIdx],
    ) -> bool {
        if targets.is_empty() {
            return false;
        }
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<NodeIdx> = from
            .iter()
            .flat_map(|idx| self.nodes[*idx].part_of.iter().copied())
            .collect();
        while let Some(idx) = stack.pop() {
            if targets.contains(&idx) {
                return true;
            }
            if std::mem::replace(&mut visited[idx], true) {
                continue;
            }
            stack.extend(self.nodes[idx].part_of.iter().copied());
        }
        false
    }

    fn add_edge(
        &mut self,
        child: NodeIdx,
        parent: NodeIdx,
    ) -> Result<()> {
        if child == parent || self.reaches(&[parent], &[child]) {
            return Err(FeatureTreeError::CyclicType {
                child:  self.nodes[child].canonical().to_string(),
                parent: self.nodes[parent].canonical().to_string(),
            });
        }
        self.nodes[child].part_of.insert(parent);
        Ok(())
    }

    /// Defines a new type named `id`.
    ///
    /// Every entry of `is_a` and `part_of` must resolve to exactly one
    /// existing type. Nothing is changed if any of them fails.
    pub fn define_type(
        &mut self,
        id: &str,
        exact_synonyms: &[&str],
        rough_synonyms: &[&str],
        is_a: &[&str],
        part_of: &[&str],
    ) -> Result<()> {
        if self.exact.contains_key(id) {
            return Err(FeatureTreeError::TypeAlreadyDefined {
                type_name: id.to_string(),
            });
        }
        let parents: Vec<NodeIdx> = is_a
            .iter()
            .chain(part_of.iter())
            .map(|name| self.resolve(name))
            .collect::<Result<_>>()?;

        let node = self.nodes.len();
        self.nodes.push(TypeNode {
            names:       IndexSet::new(),
            rough_names: IndexSet::new(),
            part_of:     IndexSet::new(),
        });
        for name in std::iter::once(id).chain(exact_synonyms.iter().copied()) {
            self.register(node, name);
        }
        for name in rough_synonyms {
            self.register_rough(node, name);
        }
        // A fresh node has no incoming edges, so none of these can close a
        // cycle.
        for parent in parents {
            self.add_edge(node, parent)?;
        }
        debug!(
            "Defined type '{}' with {} synonyms, part of [{}]",
            id,
            exact_synonyms.len(),
            is_a.iter().chain(part_of.iter()).join(", ")
        );
        Ok(())
    }

    /// Declares `child` part of `parent`.
    pub fn add_part_of(
        &mut self,
        child: &str,
        parent: &str,
    ) -> Result<()> {
        let child_idx = self.resolve(child)?;
        let parent_idx = self.resolve(parent)?;
        self.add_edge(child_idx, parent_idx)?;
        debug!("Added edge '{}' part of '{}'", child, parent);
        Ok(())
    }

    /// Declares `sub_type` a kind of `super_type`. Stored as a part-of edge.
    pub fn add_is_a(
        &mut self,
        sub_type: &str,
        super_type: &str,
    ) -> Result<()> {
        self.add_part_of(sub_type, super_type)
    }

    /// Registers `synonym` as another exact name of `existing`.
    pub fn add_synonym(
        &mut self,
        existing: &str,
        synonym: &str,
    ) -> Result<()> {
        let node = self.resolve(existing)?;
        self.register(node, synonym);
        Ok(())
    }

    pub fn add_rough_synonym(
        &mut self,
        existing: &str,
        synonym: &str,
    ) -> Result<()> {
        let node = self.resolve(existing)?;
        self.register_rough(node, synonym);
        Ok(())
    }

    pub fn contains_type(
        &self,
        name: &str,
    ) -> bool {
        !self.candidates(name).is_empty()
    }

    /// Canonical name of `name`, if it names exactly one type.
    pub fn canonical_name(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.resolve(name)
            .ok()
            .map(|idx| self.nodes[idx].canonical())
    }

    /// True if `a` and `b` are exact names of a common type.
    pub fn is_synonym(
        &self,
        a: &str,
        b: &str,
    ) -> bool {
        let b_nodes = self.candidates(b);
        self.candidates(a).iter().any(|idx| b_nodes.contains(idx))
    }

    /// Every exact name of every type `name` refers to, including `name`.
    pub fn synonyms(
        &self,
        name: &str,
    ) -> Vec<String> {
        self.candidates(name)
            .iter()
            .flat_map(|idx| self.nodes[*idx].names.iter().cloned())
            .unique()
            .collect()
    }

    /// Exact and rough names of every type `name` is an exact or rough name
    /// of.
    pub fn rough_synonyms(
        &self,
        name: &str,
    ) -> Vec<String> {
        self.rough_candidates(name)
            .flat_map(|idx| {
                let node = &self.nodes[idx];
                node.names.iter().chain(node.rough_names.iter()).cloned()
            })
            .unique()
            .collect()
    }

    pub fn is_rough_synonym(
        &self,
        a: &str,
        b: &str,
    ) -> bool {
        let b_nodes = self.rough_candidates(b).collect_vec();
        self.rough_candidates(a).any(|idx| b_nodes.contains(&idx))
    }

    /// True if some type named `child` transitively reaches some type named
    /// `parent`. A type is never part of itself.
    pub fn part_of(
        &self,
        child: &str,
        parent: &str,
    ) -> bool {
        self.reaches(self.candidates(child), self.candidates(parent))
    }

    pub fn is_a(
        &self,
        sub_type: &str,
        super_type: &str,
    ) -> bool {
        self.part_of(sub_type, super_type)
    }

    /// True if every type named `name` has no outgoing edges, or the name is
    /// unknown.
    pub(crate) fn allowed_at_top_level(
        &self,
        name: &str,
    ) -> bool {
        self.candidates(name)
            .iter()
            .all(|idx| self.nodes[*idx].part_of.is_empty())
    }

    pub(crate) fn is_cds(
        &self,
        name: &str,
    ) -> bool {
        self.is_synonym(name, CDS_TYPE)
    }

    /// Renders the schema in Graphviz DOT. Edges point from the part to the
    /// whole.
    pub fn visualize(&self) -> String {
        let mut dot = String::from("digraph schema {\n    rankdir=BT;\n");
        for (idx, node) in self.nodes.iter().enumerate() {
            let label = node.names.iter().map(|n| n.replace('"', "\\\"")).join("\\n");
            let _ = writeln!(dot, "    t{idx} [label=\"{label}\"];");
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            for parent in node.part_of.iter() {
                let _ = writeln!(dot, "    t{idx} -> t{parent};");
            }
        }
        dot.push('}');
        dot.push('\n');
        dot
    }
}
