//! Node store.
//!
//! A [`Graph`] owns an arena of feature nodes, the natural-ID and Name
//! indices, the [`TypeSchema`] that governs nesting, the multiple-parentage
//! flag and a topology version.
//!
//! - Every mutation validates first and applies second, so a failed call
//!   leaves the graph untouched.
//! - Locks are taken per call and released before returning. The schema
//!   lock is always acquired before the arena lock.
//! - The topology version moves on insert, delete, reparent and reorder,
//!   never on attribute or range edits. Traversals compare it before and
//!   after running.
//! - Deletion is O(1): the node is unlinked from its parents. Handles into
//!   the detached subtree fail lazily on their next access.

mod node;
#[cfg(test)]
mod tests;

use std::sync::atomic::{
    AtomicU64,
    Ordering,
};

use log::{
    debug,
    trace,
};
pub use node::NodeId;
pub(crate) use node::{
    Arena,
    Node,
};
use parking_lot::{
    RwLock,
    RwLockReadGuard,
    RwLockWriteGuard,
};

use crate::data_structs::record::{
    check_segments,
    is_reserved_tag,
    FeatureRecord,
    NewFeature,
    NAME_TAG,
};
use crate::data_structs::schema::TypeSchema;
use crate::data_structs::typedef::{
    AttributeMap,
    FeatureStr,
    Span,
};
use crate::data_structs::Phase;
use crate::error::{
    FeatureTreeError,
    Result,
};

const ROOT_TYPE_LABEL: &str = "<genome root>";

#[derive(Debug)]
pub struct Graph {
    arena:              RwLock<Arena>,
    schema:             RwLock<TypeSchema>,
    multiple_parentage: bool,
    topology:           AtomicU64,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(TypeSchema::default(), false)
    }
}

impl Graph {
    pub fn new(
        schema: TypeSchema,
        multiple_parentage: bool,
    ) -> Self {
        Self {
            arena: RwLock::new(Arena::default()),
            schema: RwLock::new(schema),
            multiple_parentage,
            topology: AtomicU64::new(0),
        }
    }

    pub fn topology_version(&self) -> u64 {
        self.topology.load(Ordering::SeqCst)
    }

    pub fn multiple_parentage(&self) -> bool {
        self.multiple_parentage
    }

    /// Number of live features.
    pub fn len(&self) -> usize {
        self.arena.read().preorder(NodeId::ROOT).len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.read().node(NodeId::ROOT).belows.is_empty()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Arena> {
        self.arena.read()
    }

    pub(crate) fn schema(&self) -> RwLockReadGuard<'_, TypeSchema> {
        self.schema.read()
    }

    pub(crate) fn schema_mut(&self) -> RwLockWriteGuard<'_, TypeSchema> {
        self.schema.write()
    }

    fn bump_topology(&self) {
        self.topology.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn is_live(
        &self,
        node: NodeId,
    ) -> bool {
        self.arena.read().is_live(node)
    }

    pub(crate) fn with_record<R, F>(
        &self,
        node: NodeId,
        read: F,
    ) -> Result<R>
    where
        F: FnOnce(&FeatureRecord) -> R, {
        let arena = self.arena.read();
        Ok(read(arena.record(node)?))
    }

    pub(crate) fn natural_id(
        &self,
        node: NodeId,
    ) -> Result<Option<FeatureStr>> {
        Ok(self.arena.read().check_live(node)?.id.clone())
    }

    /// Live feature parents of `node`, the root excluded.
    pub(crate) fn parents(
        &self,
        node: NodeId,
    ) -> Result<Vec<NodeId>> {
        let arena = self.arena.read();
        arena.check_live(node)?;
        Ok(arena.live_parents(node).collect())
    }

    /// Natural IDs of the live feature parents, i.e. the derived `Parent`
    /// values.
    pub(crate) fn parent_ids(
        &self,
        node: NodeId,
    ) -> Result<Vec<FeatureStr>> {
        let arena = self.arena.read();
        arena.check_live(node)?;
        Ok(arena
            .live_parents(node)
            .filter_map(|parent| arena.node(parent).id.clone())
            .collect())
    }

    pub(crate) fn children(
        &self,
        node: NodeId,
    ) -> Result<Vec<NodeId>> {
        Ok(self.arena.read().check_live(node)?.belows.clone())
    }

    /// Live nodes strictly below `node`, in pre-order.
    pub(crate) fn descendants(
        &self,
        node: NodeId,
    ) -> Result<Vec<NodeId>> {
        let arena = self.arena.read();
        arena.check_live(node)?;
        Ok(arena.preorder(node))
    }

    pub(crate) fn by_id(
        &self,
        id: &str,
    ) -> Option<NodeId> {
        self.arena.read().by_id(id)
    }

    pub(crate) fn by_name(
        &self,
        name: &str,
    ) -> Vec<NodeId> {
        self.arena.read().by_name(name)
    }

    /// Live holder of `id` strictly below `anchor`. `None` as well when
    /// `anchor` itself is dead.
    pub(crate) fn by_id_below(
        &self,
        anchor: NodeId,
        id: &str,
    ) -> Option<NodeId> {
        let arena = self.arena.read();
        if !arena.is_live(anchor) {
            return None;
        }
        arena
            .by_id(id)
            .filter(|node| *node != anchor && arena.has_ancestor(*node, anchor))
    }

    pub(crate) fn by_name_below(
        &self,
        anchor: NodeId,
        name: &str,
    ) -> Vec<NodeId> {
        let arena = self.arena.read();
        if !arena.is_live(anchor) {
            return Vec::new();
        }
        arena
            .by_name(name)
            .into_iter()
            .filter(|node| *node != anchor && arena.has_ancestor(*node, anchor))
            .collect()
    }

    /// Inserts a new feature as the last child of `parent`.
    pub(crate) fn insert(
        &self,
        parent: NodeId,
        feature: NewFeature,
    ) -> Result<NodeId> {
        let schema = self.schema.read();
        let mut arena = self.arena.write();

        let parent_node = arena.check_live(parent)?;
        check_segments(feature.ranges(), feature.phases())?;
        if !parent.is_root() && parent_node.id.is_none() {
            return Err(FeatureTreeError::ParentLacksId {
                parent_type: parent_type(parent_node).to_string(),
            });
        }
        check_placement(&schema, feature.feature_type(), parent_node)?;
        check_phases(&schema, feature.feature_type(), feature.phases())?;

        let (id, record) = feature.into_record()?;
        if let Some(id) = id.as_deref() {
            arena.check_id_free(id, None)?;
        }

        let node = arena.push(Node {
            record: Some(record),
            id:     id.map(FeatureStr::from),
            aboves: node::single_parent(parent),
            belows: Vec::new(),
        });
        arena.node_mut(parent).belows.push(node);
        self.bump_topology();
        trace!("Inserted {} under {}", node, parent);
        Ok(node)
    }

    /// Links an existing feature under one more parent.
    pub(crate) fn add_parent(
        &self,
        child: NodeId,
        parent: NodeId,
    ) -> Result<()> {
        if !self.multiple_parentage {
            return Err(FeatureTreeError::MultipleParentage);
        }
        let schema = self.schema.read();
        let mut arena = self.arena.write();

        let child_node = arena.check_live(child)?;
        if child.is_root() {
            return Err(FeatureTreeError::invalid("the store root cannot have parents"));
        }
        if child_node.aboves.contains(&parent) {
            return Err(FeatureTreeError::invalid(format!(
                "{child} is already a child of {parent}"
            )));
        }
        let child_type = parent_type(child_node).to_string();
        let parent_node = arena.check_live(parent)?;
        if !parent.is_root() && parent_node.id.is_none() {
            return Err(FeatureTreeError::ParentLacksId {
                parent_type: parent_type(parent_node).to_string(),
            });
        }
        check_placement(&schema, &child_type, parent_node)?;
        if arena.has_ancestor(parent, child) {
            return Err(FeatureTreeError::invalid(format!(
                "linking {child} under {parent} would create a cycle"
            )));
        }

        arena.link(parent, child);
        self.bump_topology();
        trace!("Linked {} under additional parent {}", child, parent);
        Ok(())
    }

    /// Detaches `node` from every parent. Its subtree becomes unreachable.
    pub(crate) fn delete(
        &self,
        node: NodeId,
    ) -> Result<()> {
        if node.is_root() {
            return Err(FeatureTreeError::invalid("the store root cannot be deleted"));
        }
        let mut arena = self.arena.write();
        arena.check_live(node)?;
        arena.detach(node);
        self.bump_topology();
        trace!("Deleted {}", node);
        Ok(())
    }

    /// Replaces the range/phase pairs of `node` with the output of `update`.
    pub(crate) fn update_segments<F>(
        &self,
        node: NodeId,
        update: F,
    ) -> Result<()>
    where
        F: FnOnce(&FeatureRecord) -> Result<(Vec<Span>, Vec<Phase>)>, {
        let schema = self.schema.read();
        let mut arena = self.arena.write();

        let has_id = arena.check_live(node)?.id.is_some();
        let record = arena.record(node)?;
        let (ranges, phases) = update(record)?;
        check_segments(&ranges, &phases)?;
        check_phases(&schema, record.feature_type(), &phases)?;
        if ranges.len() > 1 && !has_id {
            return Err(FeatureTreeError::DiscontinuousLacksId);
        }
        arena.record_mut(node)?.set_segments(ranges, phases);
        Ok(())
    }

    /// Edits the scalar columns of `node`.
    pub(crate) fn update_record<F>(
        &self,
        node: NodeId,
        update: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut FeatureRecord), {
        let mut arena = self.arena.write();
        update(arena.record_mut(node)?);
        Ok(())
    }

    /// Edits the attribute map of `node` under `tag`, keeping the Name index
    /// in step.
    pub(crate) fn update_attributes<F>(
        &self,
        node: NodeId,
        tag: &str,
        update: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut AttributeMap), {
        if is_reserved_tag(tag) {
            return Err(FeatureTreeError::ReservedAttribute {
                tag: tag.to_string(),
            });
        }
        let mut arena = self.arena.write();
        let old_names = arena.record(node)?.names().to_vec();
        update(arena.record_mut(node)?.attributes_mut());
        if tag == NAME_TAG {
            let new_names = arena.record(node)?.names().to_vec();
            arena.unindex_names(node, &old_names);
            arena.index_names(node, &new_names);
        }
        Ok(())
    }

    /// Sets or removes the natural ID of `node`.
    pub(crate) fn set_id(
        &self,
        node: NodeId,
        id: Option<&str>,
    ) -> Result<()> {
        let mut arena = self.arena.write();
        let current = arena.record(node)?;
        match id {
            Some(new) => arena.check_id_free(new, Some(node))?,
            None => {
                let node_ref = arena.node(node);
                if !node_ref.belows.is_empty() {
                    return Err(FeatureTreeError::IdRequired {
                        id: node_ref.id.as_deref().unwrap_or_default().to_string(),
                    });
                }
                if current.multiplicity() > 1 {
                    return Err(FeatureTreeError::DiscontinuousLacksId);
                }
            },
        }
        arena.set_natural_id(node, id.map(FeatureStr::from));
        Ok(())
    }

    /// Replaces the child order of `node` with `order`, which must be a
    /// permutation of the current children. `seen_version` is the topology
    /// version `order` was computed against.
    pub(crate) fn reorder_children(
        &self,
        node: NodeId,
        order: Vec<NodeId>,
        seen_version: u64,
    ) -> Result<()> {
        let mut arena = self.arena.write();
        arena.check_live(node)?;
        let current = self.topology_version();
        if current != seen_version {
            return Err(FeatureTreeError::ConcurrentModification {
                before: seen_version,
                after:  current,
            });
        }
        debug_assert_eq!(arena.node(node).belows.len(), order.len());
        arena.node_mut(node).belows = order;
        self.bump_topology();
        Ok(())
    }

    /// Independent deep copy holding only the live features.
    pub(crate) fn copy(&self) -> Graph {
        let schema = self.schema.read().clone();
        let arena = self.arena.read();
        let compacted = arena.compact();
        debug!(
            "Copied graph: {} live nodes out of {} allocated slots",
            compacted.capacity() - 1,
            arena.capacity() - 1
        );
        Graph {
            arena:              RwLock::new(compacted),
            schema:             RwLock::new(schema),
            multiple_parentage: self.multiple_parentage,
            topology:           AtomicU64::new(0),
        }
    }
}

fn parent_type(node: &Node) -> &str {
    node.record
        .as_ref()
        .map(|r| r.feature_type().as_str())
        .unwrap_or(ROOT_TYPE_LABEL)
}

/// Checks that a feature of `child_type` may sit directly under `parent`.
///
/// Under the root any type is accepted, except a known type that the schema
/// declares part of something else.
fn check_placement(
    schema: &TypeSchema,
    child_type: &str,
    parent: &Node,
) -> Result<()> {
    match parent.record.as_ref() {
        None if schema.allowed_at_top_level(child_type) => Ok(()),
        None => {
            Err(FeatureTreeError::TypeCompatibility {
                child_type:  child_type.to_string(),
                parent_type: ROOT_TYPE_LABEL.to_string(),
            })
        },
        Some(_) if !schema.contains_type(child_type) => {
            Err(FeatureTreeError::NotInOntology {
                type_name: child_type.to_string(),
            })
        },
        Some(record) if schema.part_of(child_type, record.feature_type()) => Ok(()),
        Some(record) => {
            Err(FeatureTreeError::TypeCompatibility {
                child_type:  child_type.to_string(),
                parent_type: record.feature_type().to_string(),
            })
        },
    }
}

fn check_phases(
    schema: &TypeSchema,
    feature_type: &str,
    phases: &[Phase],
) -> Result<()> {
    if schema.is_cds(feature_type) && phases.iter().any(|p| !p.is_specified()) {
        return Err(FeatureTreeError::CdsUnspecifiedPhase {
            type_name: feature_type.to_string(),
        });
    }
    Ok(())
}
