//! Parallel bottom-up traversal of a subtree.
//!
//! Every child subtree is visited as its own rayon task on
//! [`THREAD_POOL`](crate::utils::THREAD_POOL), and a node's own work starts
//! only after all of its children have joined. Siblings run in no particular
//! order.
//!
//! The anchor of a traversal is either the store root, whose top-level
//! features and everything below are visited, or a feature, which is
//! visited together with its descendants.
//!
//! No lock is held while a callback runs. Each entry point records the
//! topology version before starting and fails with
//! [`FeatureTreeError::ConcurrentModification`] if it moved by the end.
//! Graphs that allow multiple parentage are not traversable.
//!
//! [`fold`] combines results as `node ⊕ (child₁ ⊕ … ⊕ childₙ)` with
//! children in stored order, so an associative `combine` yields the same
//! value as a sequential pre-order fold.


use hashbrown::HashSet;
use log::{
    debug,
    trace,
};
use rayon::prelude::*;

use crate::data_structs::{
    Graph,
    NodeId,
};
use crate::error::{
    FeatureTreeError,
    Result,
};
use crate::facade::Wrap;
use crate::utils::THREAD_POOL;

/// Runs `body` on the traversal pool, turning any topology change during
/// the run into an error.
pub(crate) fn guarded<R, F>(
    graph: &Graph,
    body: F,
) -> Result<R>
where
    R: Send,
    F: FnOnce() -> Result<R> + Send, {
    if graph.multiple_parentage() {
        return Err(FeatureTreeError::invalid(
            "traversal is not supported when multiple parentage is enabled",
        ));
    }
    let before = graph.topology_version();
    let outcome = THREAD_POOL.install(body);
    let after = graph.topology_version();
    if before != after {
        debug!("Topology moved from {before} to {after} during traversal");
        return Err(FeatureTreeError::ConcurrentModification { before, after });
    }
    outcome
}

/// Calls `operation` on every node under `anchor` that passes `filter`,
/// children before parents.
pub(crate) fn for_each<'g, W, O, P>(
    graph: &'g Graph,
    anchor: NodeId,
    operation: &O,
    filter: &P,
) -> Result<()>
where
    W: Wrap<'g>,
    O: Fn(W) -> Result<()> + Sync,
    P: Fn(W) -> Result<bool> + Sync, {
    trace!("for_each from {anchor}");
    guarded(graph, || visit(graph, anchor, operation, filter))
}

fn visit<'g, W, O, P>(
    graph: &'g Graph,
    node: NodeId,
    operation: &O,
    filter: &P,
) -> Result<()>
where
    W: Wrap<'g>,
    O: Fn(W) -> Result<()> + Sync,
    P: Fn(W) -> Result<bool> + Sync, {
    let children = graph.children(node)?;
    children
        .par_iter()
        .try_for_each(|child| visit(graph, *child, operation, filter))?;

    if !node.is_root() {
        let view = W::wrap(graph, node);
        if filter(view)? {
            operation(view)?;
        }
    }
    Ok(())
}

/// Bottom-up fold of every node under `anchor` that passes `filter`.
///
/// `Ok(None)` means no node contributed: the subtree was empty or the
/// filter rejected everything.
pub(crate) fn fold<'g, W, R, T, C, P>(
    graph: &'g Graph,
    anchor: NodeId,
    transform: &T,
    combine: &C,
    filter: &P,
) -> Result<Option<R>>
where
    W: Wrap<'g>,
    R: Send,
    T: Fn(W) -> Result<R> + Sync,
    C: Fn(R, R) -> Result<R> + Sync,
    P: Fn(W) -> Result<bool> + Sync, {
    trace!("fold from {anchor}");
    guarded(graph, || fold_node(graph, anchor, transform, combine, filter))
}

fn fold_node<'g, W, R, T, C, P>(
    graph: &'g Graph,
    node: NodeId,
    transform: &T,
    combine: &C,
    filter: &P,
) -> Result<Option<R>>
where
    W: Wrap<'g>,
    R: Send,
    T: Fn(W) -> Result<R> + Sync,
    C: Fn(R, R) -> Result<R> + Sync,
    P: Fn(W) -> Result<bool> + Sync, {
    let children = graph.children(node)?;
    let folded = children
        .par_iter()
        .map(|child| fold_node(graph, *child, transform, combine, filter))
        .collect::<Result<Vec<Option<R>>>>()?;

    let mut beneath: Option<R> = None;
    for value in folded.into_iter().flatten() {
        beneath = Some(match beneath {
            None => value,
            Some(acc) => combine(acc, value)?,
        });
    }

    if node.is_root() {
        return Ok(beneath);
    }
    let view = W::wrap(graph, node);
    if !filter(view)? {
        return Ok(beneath);
    }
    let own = transform(view)?;
    Ok(Some(match beneath {
        None => own,
        Some(rest) => combine(own, rest)?,
    }))
}

/// Deletes, children first, every node of `doomed` under `anchor` that has
/// no children left at its turn. Returns the number of deleted nodes.
pub(crate) fn purge(
    graph: &Graph,
    anchor: NodeId,
    doomed: &HashSet<NodeId>,
) -> Result<usize> {
    let mut order = graph.descendants(anchor)?;
    if !anchor.is_root() {
        order.insert(0, anchor);
    }

    let mut removed = 0;
    for node in order.into_iter().rev() {
        if doomed.contains(&node) && graph.children(node)?.is_empty() {
            graph.delete(node)?;
            removed += 1;
        }
    }
    debug!("Filter removed {removed} of {} failing features", doomed.len());
    Ok(removed)
}
