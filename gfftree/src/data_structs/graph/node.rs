use std::fmt::Display;

use hashbrown::{
    HashMap,
    HashSet,
};
use smallvec::{
    smallvec,
    SmallVec,
};

use crate::data_structs::record::FeatureRecord;
use crate::data_structs::typedef::FeatureStr;
use crate::error::{
    FeatureTreeError,
    Result,
};

/// Opaque handle of a slot in a [`super::Graph`] arena.
///
/// Slot `0` is the store root. Handles are only meaningful for the graph
/// that issued them and are never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl Display for NodeId {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type Parents = SmallVec<[NodeId; 1]>;

#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// `None` only for the root.
    pub(crate) record: Option<FeatureRecord>,
    pub(crate) id:     Option<FeatureStr>,
    /// Empty for the root and for detached nodes.
    pub(crate) aboves: Parents,
    pub(crate) belows: Vec<NodeId>,
}

impl Node {
    fn root() -> Self {
        Self {
            record: None,
            id:     None,
            aboves: SmallVec::new(),
            belows: Vec::new(),
        }
    }
}

/// Node storage with the natural-ID and Name indices.
///
/// Index entries of nodes that became unreachable through the deletion of
/// an ancestor are not purged eagerly; every lookup filters dead nodes.
#[derive(Debug, Clone)]
pub(crate) struct Arena {
    nodes: Vec<Node>,
    ids:   HashMap<FeatureStr, NodeId>,
    names: HashMap<String, SmallVec<[NodeId; 1]>>,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            nodes: vec![Node::root()],
            ids:   HashMap::new(),
            names: HashMap::new(),
        }
    }
}

impl Arena {
    /// Number of allocated slots, root and dead nodes included.
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(
        &self,
        id: NodeId,
    ) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(
        &mut self,
        id: NodeId,
    ) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// True if a chain of parent links leads from `id` to the root.
    pub(crate) fn is_live(
        &self,
        id: NodeId,
    ) -> bool {
        let mut current = id;
        loop {
            if current.is_root() {
                return true;
            }
            match self.node(current).aboves.as_slice() {
                [] => return false,
                [single] => current = *single,
                _ => return self.is_live_dag(current),
            }
        }
    }

    fn is_live_dag(
        &self,
        id: NodeId,
    ) -> bool {
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeId> = vec![id];
        while let Some(current) = stack.pop() {
            if current.is_root() {
                return true;
            }
            if seen.insert(current) {
                stack.extend(self.node(current).aboves.iter().copied());
            }
        }
        false
    }

    /// Feature parents of `id` that are still reachable from the root. A
    /// parent cut off by the deletion of one of its own ancestors keeps its
    /// link until the next compaction, so it is skipped here.
    pub(crate) fn live_parents(
        &self,
        id: NodeId,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .aboves
            .iter()
            .copied()
            .filter(move |parent| !parent.is_root() && self.is_live(*parent))
    }

    pub(crate) fn check_live(
        &self,
        id: NodeId,
    ) -> Result<&Node> {
        if self.is_live(id) {
            Ok(self.node(id))
        }
        else {
            Err(FeatureTreeError::DeletedAccess)
        }
    }

    /// Record of a live feature. Fails for dead nodes and for the root.
    pub(crate) fn record(
        &self,
        id: NodeId,
    ) -> Result<&FeatureRecord> {
        self.check_live(id)?
            .record
            .as_ref()
            .ok_or_else(|| FeatureTreeError::invalid("the store root has no record"))
    }

    pub(crate) fn record_mut(
        &mut self,
        id: NodeId,
    ) -> Result<&mut FeatureRecord> {
        self.check_live(id)?;
        self.node_mut(id)
            .record
            .as_mut()
            .ok_or_else(|| FeatureTreeError::invalid("the store root has no record"))
    }

    /// Live node currently holding `id`.
    pub(crate) fn by_id(
        &self,
        id: &str,
    ) -> Option<NodeId> {
        self.ids
            .get(id)
            .copied()
            .filter(|node| self.is_live(*node))
    }

    pub(crate) fn by_name(
        &self,
        name: &str,
    ) -> Vec<NodeId> {
        self.names
            .get(name)
            .map(|nodes| {
                nodes
                    .iter()
                    .copied()
                    .filter(|node| self.is_live(*node))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fails if `id` is held by a live node other than `owner`.
    pub(crate) fn check_id_free(
        &self,
        id: &str,
        owner: Option<NodeId>,
    ) -> Result<()> {
        match self.by_id(id) {
            Some(existing) if Some(existing) != owner => {
                Err(FeatureTreeError::IdConflict { id: id.to_string() })
            },
            _ => Ok(()),
        }
    }

    pub(crate) fn push(
        &mut self,
        node: Node,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if let Some(natural) = node.id.clone() {
            self.ids.insert(natural, id);
        }
        let names: Vec<String> = node
            .record
            .as_ref()
            .map(|r| r.names().to_vec())
            .unwrap_or_default();
        self.nodes.push(node);
        self.index_names(id, &names);
        id
    }

    pub(crate) fn index_names(
        &mut self,
        id: NodeId,
        names: &[String],
    ) {
        for name in names {
            let entry = self.names.entry(name.clone()).or_default();
            if !entry.contains(&id) {
                entry.push(id);
            }
        }
    }

    pub(crate) fn unindex_names(
        &mut self,
        id: NodeId,
        names: &[String],
    ) {
        for name in names {
            if let Some(entry) = self.names.get_mut(name) {
                entry.retain(|n| *n != id);
                if entry.is_empty() {
                    self.names.remove(name);
                }
            }
        }
    }

    pub(crate) fn set_natural_id(
        &mut self,
        node: NodeId,
        id: Option<FeatureStr>,
    ) {
        if let Some(old) = self.node(node).id.clone() {
            if self.ids.get(&old) == Some(&node) {
                self.ids.remove(&old);
            }
        }
        if let Some(new) = id.clone() {
            self.ids.insert(new, node);
        }
        self.node_mut(node).id = id;
    }

    /// Unlinks `id` from all of its parents and drops its own index
    /// entries. The subtree below becomes unreachable.
    pub(crate) fn detach(
        &mut self,
        id: NodeId,
    ) {
        let parents = std::mem::take(&mut self.node_mut(id).aboves);
        for parent in parents {
            self.node_mut(parent).belows.retain(|child| *child != id);
        }
        self.set_natural_id(id, None);
        let names = self
            .node(id)
            .record
            .as_ref()
            .map(|r| r.names().to_vec())
            .unwrap_or_default();
        self.unindex_names(id, &names);
    }

    pub(crate) fn link(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) {
        self.node_mut(parent).belows.push(child);
        self.node_mut(child).aboves.push(parent);
    }

    /// True if `ancestor` can be reached from `id` by parent links,
    /// `id` itself included.
    pub(crate) fn has_ancestor(
        &self,
        id: NodeId,
        ancestor: NodeId,
    ) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if seen.insert(current) {
                stack.extend(self.node(current).aboves.iter().copied());
            }
        }
        false
    }

    /// Live nodes below `start` in pre-order, `start` excluded. A node with
    /// several parents is yielded once, after the last of its parents that
    /// lies inside the walked subtree.
    pub(crate) fn preorder(
        &self,
        start: NodeId,
    ) -> Vec<NodeId> {
        let mut emitted: HashSet<NodeId> = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.node(start).belows.iter().rev().copied().collect();
        emitted.insert(start);
        while let Some(current) = stack.pop() {
            if emitted.contains(&current) {
                continue;
            }
            let aboves = &self.node(current).aboves;
            let waiting = aboves.len() > 1
                && aboves
                    .iter()
                    .any(|parent| !emitted.contains(parent) && self.has_ancestor(*parent, start));
            if waiting {
                continue;
            }
            emitted.insert(current);
            order.push(current);
            stack.extend(self.node(current).belows.iter().rev().copied());
        }
        order
    }

    /// Arena holding only the live nodes, in pre-order, with every handle
    /// remapped.
    pub(crate) fn compact(&self) -> Arena {
        let order = self.preorder(NodeId::ROOT);
        let mut mapping: HashMap<NodeId, NodeId> = HashMap::with_capacity(order.len() + 1);
        mapping.insert(NodeId::ROOT, NodeId::ROOT);
        for (idx, old) in order.iter().enumerate() {
            mapping.insert(*old, NodeId(idx as u32 + 1));
        }

        let mut compacted = Arena::default();
        compacted.node_mut(NodeId::ROOT).belows = self
            .node(NodeId::ROOT)
            .belows
            .iter()
            .filter_map(|child| mapping.get(child).copied())
            .collect();
        for old in order {
            let node = self.node(old);
            let aboves: Parents = node
                .aboves
                .iter()
                .filter_map(|parent| mapping.get(parent).copied())
                .collect();
            let belows = node
                .belows
                .iter()
                .filter_map(|child| mapping.get(child).copied())
                .collect();
            compacted.push(Node {
                record: node.record.clone(),
                id: node.id.clone(),
                aboves,
                belows,
            });
        }
        compacted
    }
}

pub(crate) fn single_parent(parent: NodeId) -> Parents {
    smallvec![parent]
}
