//! Read-only and read-write views over one [`Graph`].
//!
//! | view            | read | write |
//! |-----------------|------|-------|
//! | [`Feature`]     | yes  |       |
//! | [`MutableFeature`] | yes | yes |
//! | [`Genome`]      | yes  |       |
//! | [`MutableGenome`] | yes | yes  |
//!
//! Feature handles are a copyable `(&Graph, slot)` pair; genomes own their
//! graph. Capabilities are expressed as traits:
//!
//! - [`ReadFeature`] / [`WriteFeature`]: column data, attributes and
//!   range edits of a single feature.
//! - [`ReadParent`] / [`WriteParent`]: children, descendants, the traversal
//!   operations, insertion, sorting and filtering. Implemented by features
//!   and by `&Genome` / `&MutableGenome`.
//! - [`ReadGenome`]: store-wide lookups, schema queries and GFF3 output.
//!
//! Write traits are only implemented by the mutable types, and the graph
//! behind a view is reachable only through a sealed supertrait.

mod feature;
mod genome;

use std::cmp::Ordering;
use std::hash::Hash;

pub use feature::{
    Feature,
    MutableFeature,
};
pub use genome::{
    Genome,
    MutableGenome,
};
use hashbrown::{
    HashMap,
    HashSet,
};
use indexmap::IndexMap;
use itertools::Itertools;
use num::Zero;

use crate::data_structs::record::{
    FeatureRecord,
    NewFeature,
    ID_TAG,
    PARENT_TAG,
};
use crate::data_structs::typedef::{
    AttributeMap,
    FeatureStr,
    PosType,
    ScoreType,
    Span,
};
use crate::data_structs::{
    Graph,
    NodeId,
    Phase,
    Strand,
};
use crate::error::{
    FeatureTreeError,
    Result,
};
use crate::io::gff;
use crate::traverse;

mod private {
    use crate::data_structs::{
        Graph,
        NodeId,
    };

    /// Access to the graph and slot behind a view.
    pub trait Anchored<'g>: Copy {
        fn graph(self) -> &'g Graph;

        fn anchor(self) -> NodeId;
    }

    /// Views that can be built for any slot of a graph.
    pub trait Wrap<'g>: Anchored<'g> + Send + Sync {
        fn wrap(
            graph: &'g Graph,
            node: NodeId,
        ) -> Self;
    }
}

pub(crate) use private::{
    Anchored,
    Wrap,
};

fn always<W>(_: W) -> Result<bool> {
    Ok(true)
}

fn concat<T>(
    mut a: Vec<T>,
    b: Vec<T>,
) -> Result<Vec<T>> {
    a.extend(b);
    Ok(a)
}

fn type_matches(
    graph: &Graph,
    actual: &str,
    wanted: &str,
) -> bool {
    actual == wanted || graph.schema().is_synonym(actual, wanted)
}

/// Read access to the data of one feature.
pub trait ReadFeature<'g>: Wrap<'g> {
    /// False once the feature or one of its ancestors has been deleted.
    fn is_live(self) -> bool {
        self.graph().is_live(self.anchor())
    }

    /// Snapshot of the column data.
    fn record(self) -> Result<FeatureRecord> {
        self.graph()
            .with_record(self.anchor(), FeatureRecord::clone)
    }

    fn seqid(self) -> Result<FeatureStr> {
        self.graph()
            .with_record(self.anchor(), |r| r.seqid().clone())
    }

    fn source(self) -> Result<FeatureStr> {
        self.graph()
            .with_record(self.anchor(), |r| r.source().clone())
    }

    fn feature_type(self) -> Result<FeatureStr> {
        self.graph()
            .with_record(self.anchor(), |r| r.feature_type().clone())
    }

    fn ranges(self) -> Result<Vec<Span>> {
        self.graph()
            .with_record(self.anchor(), |r| r.ranges().clone())
    }

    fn phases(self) -> Result<Vec<Phase>> {
        self.graph()
            .with_record(self.anchor(), |r| r.phases().clone())
    }

    /// Number of range/phase pairs.
    fn multiplicity(self) -> Result<usize> {
        self.graph()
            .with_record(self.anchor(), FeatureRecord::multiplicity)
    }

    /// Lowest start over all ranges.
    fn start(self) -> Result<PosType> {
        self.graph().with_record(self.anchor(), FeatureRecord::start)
    }

    /// Highest end over all ranges.
    fn end(self) -> Result<PosType> {
        self.graph().with_record(self.anchor(), FeatureRecord::end)
    }

    fn length(self) -> Result<PosType> {
        self.graph().with_record(self.anchor(), FeatureRecord::length)
    }

    fn score(self) -> Result<Option<ScoreType>> {
        self.graph().with_record(self.anchor(), FeatureRecord::score)
    }

    fn strand(self) -> Result<Strand> {
        self.graph().with_record(self.anchor(), FeatureRecord::strand)
    }

    fn id(self) -> Result<Option<FeatureStr>> {
        self.graph().natural_id(self.anchor())
    }

    /// First value of the `Name` attribute.
    fn name(self) -> Result<Option<String>> {
        self.graph()
            .with_record(self.anchor(), |r| r.names().first().cloned())
    }

    fn names(self) -> Result<Vec<String>> {
        self.graph()
            .with_record(self.anchor(), |r| r.names().to_vec())
    }

    /// Values of `tag`. `ID` and `Parent` are derived from the graph.
    fn attribute(
        self,
        tag: &str,
    ) -> Result<Vec<String>> {
        match tag {
            ID_TAG => {
                Ok(self
                    .id()?
                    .into_iter()
                    .map(|id| id.to_string())
                    .collect())
            },
            PARENT_TAG => {
                Ok(self
                    .graph()
                    .parent_ids(self.anchor())?
                    .into_iter()
                    .map(|id| id.to_string())
                    .collect())
            },
            _ => {
                self.graph().with_record(self.anchor(), |r| {
                    r.attributes().get(tag).cloned().unwrap_or_default()
                })
            },
        }
    }

    /// Every attribute in output order: `ID`, `Parent`, then stored tags.
    fn all_attributes(self) -> Result<AttributeMap> {
        let mut all = IndexMap::new();
        if let Some(id) = self.id()? {
            all.insert(ID_TAG.to_string(), vec![id.to_string()]);
        }
        let parents = self.attribute(PARENT_TAG)?;
        if !parents.is_empty() {
            all.insert(PARENT_TAG.to_string(), parents);
        }
        self.graph().with_record(self.anchor(), |r| {
            all.extend(r.attributes().iter().map(|(k, v)| (k.clone(), v.clone())))
        })?;
        Ok(all)
    }

    /// Feature parents; empty for a top-level feature.
    fn parents(self) -> Result<Vec<Self>> {
        let graph = self.graph();
        Ok(graph
            .parents(self.anchor())?
            .into_iter()
            .map(|node| Self::wrap(graph, node))
            .collect())
    }

    fn is_top_level(self) -> Result<bool> {
        Ok(self.parents()?.is_empty())
    }

    /// All feature ancestors, nearest first.
    fn ancestors(self) -> Result<Vec<Self>> {
        let graph = self.graph();
        let mut seen = HashSet::new();
        let mut queue = graph.parents(self.anchor())?;
        let mut ancestors = Vec::new();
        while !queue.is_empty() {
            let mut next = Vec::new();
            for node in queue {
                if seen.insert(node) {
                    ancestors.push(Self::wrap(graph, node));
                    next.extend(graph.parents(node)?);
                }
            }
            queue = next;
        }
        Ok(ancestors)
    }

    /// GFF3 rows of this feature, one per range.
    fn as_row(self) -> Result<String> {
        let arena = self.graph().read();
        let mut row = String::new();
        gff::write_node(&arena, self.anchor(), &mut row)?;
        Ok(row)
    }
}

/// Mutation of one feature.
pub trait WriteFeature<'g>: ReadFeature<'g> {
    fn set_seqid(
        self,
        seqid: impl Into<String>,
    ) -> Result<()> {
        let seqid = FeatureStr::from(seqid.into());
        self.graph()
            .update_record(self.anchor(), |r| r.set_seqid(seqid))
    }

    fn set_source(
        self,
        source: impl Into<String>,
    ) -> Result<()> {
        let source = FeatureStr::from(source.into());
        self.graph()
            .update_record(self.anchor(), |r| r.set_source(source))
    }

    fn set_score(
        self,
        score: Option<ScoreType>,
    ) -> Result<()> {
        self.graph()
            .update_record(self.anchor(), |r| r.set_score(score))
    }

    fn set_strand(
        self,
        strand: Strand,
    ) -> Result<()> {
        self.graph()
            .update_record(self.anchor(), |r| r.set_strand(strand))
    }

    /// Collapses the feature to a single range. The phase defaults to the
    /// current first phase.
    fn set_range(
        self,
        range: Span,
        phase: Option<Phase>,
    ) -> Result<()> {
        self.graph().update_segments(self.anchor(), |r| {
            let phase = phase.unwrap_or(r.phases()[0]);
            Ok((vec![range], vec![phase]))
        })
    }

    /// Collapses the feature to a single phase. The range defaults to the
    /// current first range.
    fn set_phase(
        self,
        phase: Phase,
        range: Option<Span>,
    ) -> Result<()> {
        self.graph().update_segments(self.anchor(), |r| {
            let range = range.unwrap_or(r.ranges()[0]);
            Ok((vec![range], vec![phase]))
        })
    }

    /// Replaces the pair at `index`.
    fn set_discontinuity(
        self,
        index: usize,
        range: Span,
        phase: Phase,
    ) -> Result<()> {
        self.graph().update_segments(self.anchor(), |r| {
            if index >= r.multiplicity() {
                return Err(FeatureTreeError::IndexOutOfBounds {
                    index,
                    multiplicity: r.multiplicity(),
                });
            }
            let mut ranges = r.ranges().clone();
            let mut phases = r.phases().clone();
            ranges[index] = range;
            phases[index] = phase;
            Ok((ranges, phases))
        })
    }

    /// Appends a range/phase pair. Requires a natural ID.
    fn add_discontinuity(
        self,
        range: Span,
        phase: Phase,
    ) -> Result<()> {
        self.graph().update_segments(self.anchor(), |r| {
            let mut ranges = r.ranges().clone();
            let mut phases = r.phases().clone();
            ranges.push(range);
            phases.push(phase);
            Ok((ranges, phases))
        })
    }

    fn set_discontinuities<I>(
        self,
        segments: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (Span, Phase)>, {
        let (ranges, phases): (Vec<Span>, Vec<Phase>) = segments.into_iter().unzip();
        self.graph()
            .update_segments(self.anchor(), move |_| Ok((ranges, phases)))
    }

    fn add_attribute(
        self,
        tag: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        self.add_attributes(tag, [value.into()])
    }

    /// Appends values to `tag`. An empty `values` is a no-op.
    fn add_attributes<I, S>(
        self,
        tag: &str,
        values: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        let values = values.into_iter().map_into::<String>().collect_vec();
        self.graph().update_attributes(self.anchor(), tag, |attrs| {
            if !values.is_empty() {
                attrs.entry(tag.to_string()).or_default().extend(values);
            }
        })
    }

    fn set_attribute(
        self,
        tag: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        self.set_attributes(tag, [value.into()])
    }

    /// Replaces the values of `tag`. An empty `values` removes the tag.
    fn set_attributes<I, S>(
        self,
        tag: &str,
        values: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        let values = values.into_iter().map_into::<String>().collect_vec();
        self.graph().update_attributes(self.anchor(), tag, |attrs| {
            if values.is_empty() {
                attrs.shift_remove(tag);
            }
            else {
                attrs.insert(tag.to_string(), values);
            }
        })
    }

    fn clear_attribute(
        self,
        tag: &str,
    ) -> Result<()> {
        self.graph().update_attributes(self.anchor(), tag, |attrs| {
            attrs.shift_remove(tag);
        })
    }

    /// Sets or removes the natural ID. Removal fails while the feature has
    /// children or more than one range.
    fn set_id(
        self,
        id: Option<&str>,
    ) -> Result<()> {
        self.graph().set_id(self.anchor(), id)
    }

    /// Detaches the feature. It and every handle into its subtree fail with
    /// [`FeatureTreeError::DeletedAccess`] afterwards.
    fn delete(self) -> Result<()> {
        self.graph().delete(self.anchor())
    }

    /// Links the feature under one more parent. Only available when the
    /// store allows multiple parentage.
    fn add_parent(
        self,
        parent: Self,
    ) -> Result<()> {
        self.graph().add_parent(self.anchor(), parent.anchor())
    }
}

/// Read access to a subtree: a feature with its descendants, or a whole
/// store.
///
/// Traversals anchored at a feature visit that feature as well as its
/// descendants; on a store they visit every live feature.
///
/// Every callback returns a [`Result`]; the first error aborts the call.
/// Callbacks run concurrently on the traversal pool, children before
/// parents. Structural changes made while a traversal runs surface as
/// [`FeatureTreeError::ConcurrentModification`] when it completes.
pub trait ReadParent<'g>: Anchored<'g> {
    type View: ReadFeature<'g> + Hash + Eq;

    fn children(self) -> Result<Vec<Self::View>> {
        let graph = self.graph();
        Ok(graph
            .children(self.anchor())?
            .into_iter()
            .map(|node| Self::View::wrap(graph, node))
            .collect())
    }

    /// Children whose type is `feature_type` or one of its synonyms.
    fn children_of_type(
        self,
        feature_type: &str,
    ) -> Result<Vec<Self::View>> {
        filter_type(self.graph(), self.children()?, feature_type)
    }

    /// Descendant holding `id`. On a store this is every live feature.
    fn by_id(
        self,
        id: &str,
    ) -> Option<Self::View> {
        let graph = self.graph();
        graph
            .by_id_below(self.anchor(), id)
            .map(|node| Self::View::wrap(graph, node))
    }

    /// Descendants carrying `name` among their `Name` values.
    fn by_name(
        self,
        name: &str,
    ) -> Vec<Self::View> {
        let graph = self.graph();
        graph
            .by_name_below(self.anchor(), name)
            .into_iter()
            .map(|node| Self::View::wrap(graph, node))
            .collect()
    }

    /// GFF3 rows of the subtree in pre-order, the anchoring feature
    /// included. A store yields its features without the version header.
    fn parent_string(self) -> Result<String> {
        gff::write_subtree(self.graph(), self.anchor())
    }

    /// Every live node below, in pre-order.
    fn descendants(self) -> Result<Vec<Self::View>> {
        let graph = self.graph();
        Ok(graph
            .descendants(self.anchor())?
            .into_iter()
            .map(|node| Self::View::wrap(graph, node))
            .collect())
    }

    fn descendants_of_type(
        self,
        feature_type: &str,
    ) -> Result<Vec<Self::View>> {
        filter_type(self.graph(), self.descendants()?, feature_type)
    }

    fn for_each<O>(
        self,
        operation: O,
    ) -> Result<()>
    where
        O: Fn(Self::View) -> Result<()> + Send + Sync, {
        traverse::for_each(
            self.graph(),
            self.anchor(),
            &operation,
            &always::<Self::View>,
        )
    }

    /// Like [`ReadParent::for_each`], skipping nodes rejected by `filter`.
    /// Descendants of a rejected node are still visited.
    fn for_each_filtered<O, P>(
        self,
        operation: O,
        filter: P,
    ) -> Result<()>
    where
        O: Fn(Self::View) -> Result<()> + Send + Sync,
        P: Fn(Self::View) -> Result<bool> + Send + Sync, {
        traverse::for_each::<Self::View, _, _>(self.graph(), self.anchor(), &operation, &filter)
    }

    /// Folds the subtree bottom-up. Fails with
    /// [`FeatureTreeError::InvalidArgument`] when there is nothing to fold.
    fn reduce<R, T, C>(
        self,
        transform: T,
        combine: C,
    ) -> Result<R>
    where
        R: Send,
        T: Fn(Self::View) -> Result<R> + Send + Sync,
        C: Fn(R, R) -> Result<R> + Send + Sync, {
        self.reduce_filtered(transform, combine, always::<Self::View>)
    }

    fn reduce_filtered<R, T, C, P>(
        self,
        transform: T,
        combine: C,
        filter: P,
    ) -> Result<R>
    where
        R: Send,
        T: Fn(Self::View) -> Result<R> + Send + Sync,
        C: Fn(R, R) -> Result<R> + Send + Sync,
        P: Fn(Self::View) -> Result<bool> + Send + Sync, {
        traverse::fold::<Self::View, _, _, _, _>(
            self.graph(),
            self.anchor(),
            &transform,
            &combine,
            &filter,
        )?
        .ok_or_else(
            || FeatureTreeError::invalid("reduce found no features to fold over"),
        )
    }

    /// First match in pre-order.
    fn find<P>(
        self,
        predicate: P,
    ) -> Result<Option<Self::View>>
    where
        P: Fn(Self::View) -> Result<bool> + Send + Sync, {
        let transform = |view: Self::View| -> Result<Option<Self::View>> {
            Ok(predicate(view)?.then_some(view))
        };
        let combine = |a: Option<Self::View>, b: Option<Self::View>| -> Result<Option<Self::View>> {
            Ok(a.or(b))
        };
        let found = traverse::fold(
            self.graph(),
            self.anchor(),
            &transform,
            &combine,
            &always::<Self::View>,
        )?;
        Ok(found.flatten())
    }

    fn any<P>(
        self,
        predicate: P,
    ) -> Result<bool>
    where
        P: Fn(Self::View) -> Result<bool> + Send + Sync, {
        let combine = |a: bool, b: bool| -> Result<bool> { Ok(a || b) };
        let any = traverse::fold(
            self.graph(),
            self.anchor(),
            &predicate,
            &combine,
            &always::<Self::View>,
        )?;
        Ok(any.unwrap_or(false))
    }

    fn all<P>(
        self,
        predicate: P,
    ) -> Result<bool>
    where
        P: Fn(Self::View) -> Result<bool> + Send + Sync, {
        let combine = |a: bool, b: bool| -> Result<bool> { Ok(a && b) };
        let all = traverse::fold(
            self.graph(),
            self.anchor(),
            &predicate,
            &combine,
            &always::<Self::View>,
        )?;
        Ok(all.unwrap_or(true))
    }

    /// Sum of `selector` over the subtree; zero when it is empty.
    fn sum_of<N, S>(
        self,
        selector: S,
    ) -> Result<N>
    where
        N: Zero + Send,
        S: Fn(Self::View) -> Result<N> + Send + Sync, {
        let combine = |a: N, b: N| -> Result<N> { Ok(a + b) };
        let sum = traverse::fold(
            self.graph(),
            self.anchor(),
            &selector,
            &combine,
            &always::<Self::View>,
        )?;
        Ok(sum.unwrap_or_else(N::zero))
    }

    /// Map built from `transform`. On duplicate keys the pair met last in
    /// pre-order wins.
    fn associate<K, V, T>(
        self,
        transform: T,
    ) -> Result<HashMap<K, V>>
    where
        K: Hash + Eq + Send,
        V: Send,
        T: Fn(Self::View) -> Result<(K, V)> + Send + Sync, {
        let single = |view: Self::View| -> Result<HashMap<K, V>> {
            let (key, value) = transform(view)?;
            let mut map = HashMap::new();
            map.insert(key, value);
            Ok(map)
        };
        let merge = |mut a: HashMap<K, V>, b: HashMap<K, V>| -> Result<HashMap<K, V>> {
            a.extend(b);
            Ok(a)
        };
        let map = traverse::fold(
            self.graph(),
            self.anchor(),
            &single,
            &merge,
            &always::<Self::View>,
        )?;
        Ok(map.unwrap_or_default())
    }

    fn associate_by<K, S>(
        self,
        key: S,
    ) -> Result<HashMap<K, Self::View>>
    where
        K: Hash + Eq + Send,
        S: Fn(Self::View) -> Result<K> + Send + Sync, {
        self.associate(|view| Ok((key(view)?, view)))
    }

    fn associate_with<V, S>(
        self,
        value: S,
    ) -> Result<HashMap<Self::View, V>>
    where
        V: Send,
        S: Fn(Self::View) -> Result<V> + Send + Sync, {
        self.associate(|view| Ok((view, value(view)?)))
    }

    /// Nodes grouped by `key`, each group in pre-order.
    fn group_by<K, S>(
        self,
        key: S,
    ) -> Result<HashMap<K, Vec<Self::View>>>
    where
        K: Hash + Eq + Send,
        S: Fn(Self::View) -> Result<K> + Send + Sync, {
        let single = |view: Self::View| -> Result<HashMap<K, Vec<Self::View>>> {
            let mut group = HashMap::new();
            group.insert(key(view)?, vec![view]);
            Ok(group)
        };
        let merge = |mut a: HashMap<K, Vec<Self::View>>,
                     b: HashMap<K, Vec<Self::View>>|
         -> Result<HashMap<K, Vec<Self::View>>> {
            for (key, views) in b {
                a.entry(key).or_default().extend(views);
            }
            Ok(a)
        };
        let groups = traverse::fold(
            self.graph(),
            self.anchor(),
            &single,
            &merge,
            &always::<Self::View>,
        )?;
        Ok(groups.unwrap_or_default())
    }

    /// Nodes passing `predicate`, in pre-order.
    fn filtered_list<P>(
        self,
        predicate: P,
    ) -> Result<Vec<Self::View>>
    where
        P: Fn(Self::View) -> Result<bool> + Send + Sync, {
        let single = |view: Self::View| -> Result<Vec<Self::View>> { Ok(vec![view]) };
        let list = traverse::fold(
            self.graph(),
            self.anchor(),
            &single,
            &concat::<Self::View>,
            &predicate,
        )?;
        Ok(list.unwrap_or_default())
    }
}

/// Structural mutation of a subtree.
pub trait WriteParent<'g>: ReadParent<'g> {
    /// Inserts `feature` as the last child of this node.
    fn insert(
        self,
        feature: NewFeature,
    ) -> Result<Self::View> {
        let graph = self.graph();
        let node = graph.insert(self.anchor(), feature)?;
        Ok(Self::View::wrap(graph, node))
    }

    /// Stable reorder of the direct children with `compare`. Children are
    /// left as they were if `compare` fails. An inconsistent `compare`
    /// yields some permutation of the children.
    fn sort_by<C>(
        self,
        mut compare: C,
    ) -> Result<()>
    where
        C: FnMut(Self::View, Self::View) -> Result<Ordering>, {
        let graph = self.graph();
        let seen = graph.topology_version();
        let children = try_sort_by(self.children()?, &mut compare)?;
        graph.reorder_children(
            self.anchor(),
            children.into_iter().map(|child| child.anchor()).collect(),
            seen,
        )
    }

    /// Stable sort of the direct children by a key computed once per child.
    fn sort_by_key<K, F>(
        self,
        mut key: F,
    ) -> Result<()>
    where
        K: Ord,
        F: FnMut(Self::View) -> Result<K>, {
        let graph = self.graph();
        let seen = graph.topology_version();
        let mut keyed = self
            .children()?
            .into_iter()
            .map(|child| -> Result<(K, NodeId)> { Ok((key(child)?, child.anchor())) })
            .collect::<Result<Vec<(K, NodeId)>>>()?;
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        graph.reorder_children(
            self.anchor(),
            keyed.into_iter().map(|(_, node)| node).collect(),
            seen,
        )
    }

    /// Deletes every node failing `predicate` that has no children left
    /// once its own children have been processed, so parents emptied by the
    /// purge are considered too. `predicate` sees the tree as it was before
    /// any deletion. Returns the number of deleted features.
    ///
    /// Called on a feature, the feature itself is subject to `predicate`
    /// and is deleted when it fails and has no children left.
    fn filter<P>(
        self,
        predicate: P,
    ) -> Result<usize>
    where
        P: Fn(Self::View) -> Result<bool> + Send + Sync, {
        let graph = self.graph();
        let failed = |view: Self::View| -> Result<Vec<NodeId>> {
            Ok(match predicate(view)? {
                true => Vec::new(),
                false => vec![view.anchor()],
            })
        };
        let failing: HashSet<NodeId> = traverse::fold(
            graph,
            self.anchor(),
            &failed,
            &concat::<NodeId>,
            &always::<Self::View>,
        )?
        .unwrap_or_default()
        .into_iter()
        .collect();
        traverse::purge(graph, self.anchor(), &failing)
    }
}

/// Store-wide queries.
pub trait ReadGenome<'g>: ReadParent<'g> {
    fn contains_id(
        self,
        id: &str,
    ) -> bool {
        self.graph().by_id(id).is_some()
    }

    fn contains_name(
        self,
        name: &str,
    ) -> bool {
        !self.graph().by_name(name).is_empty()
    }

    /// Number of live features.
    fn feature_count(self) -> usize {
        self.graph().len()
    }

    fn topology_version(self) -> u64 {
        self.graph().topology_version()
    }

    fn multiple_parentage(self) -> bool {
        self.graph().multiple_parentage()
    }

    fn contains_type(
        self,
        feature_type: &str,
    ) -> bool {
        self.graph().schema().contains_type(feature_type)
    }

    fn part_of(
        self,
        child: &str,
        parent: &str,
    ) -> bool {
        self.graph().schema().part_of(child, parent)
    }

    fn is_a(
        self,
        sub_type: &str,
        super_type: &str,
    ) -> bool {
        self.graph().schema().is_a(sub_type, super_type)
    }

    fn is_synonym(
        self,
        a: &str,
        b: &str,
    ) -> bool {
        self.graph().schema().is_synonym(a, b)
    }

    fn synonyms(
        self,
        feature_type: &str,
    ) -> Vec<String> {
        self.graph().schema().synonyms(feature_type)
    }

    fn is_rough_synonym(
        self,
        a: &str,
        b: &str,
    ) -> bool {
        self.graph().schema().is_rough_synonym(a, b)
    }

    fn rough_synonyms(
        self,
        feature_type: &str,
    ) -> Vec<String> {
        self.graph().schema().rough_synonyms(feature_type)
    }

    /// Graphviz DOT rendering of the type schema.
    fn visualize_schema(self) -> String {
        self.graph().schema().visualize()
    }

    /// Writes the whole store as GFF3.
    fn write_gff<W: std::io::Write>(
        self,
        writer: W,
    ) -> Result<()> {
        gff::write_graph(self.graph(), writer)
    }
}

/// Binary insertion sort that stops at the first failed comparison.
/// Equal elements keep their relative order.
fn try_sort_by<T, C>(
    items: Vec<T>,
    compare: &mut C,
) -> Result<Vec<T>>
where
    T: Copy,
    C: FnMut(T, T) -> Result<Ordering>, {
    let mut sorted: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let (mut low, mut high) = (0, sorted.len());
        while low < high {
            let mid = low + (high - low) / 2;
            match compare(item, sorted[mid])? {
                Ordering::Less => high = mid,
                _ => low = mid + 1,
            }
        }
        sorted.insert(low, item);
    }
    Ok(sorted)
}

fn filter_type<'g, W: ReadFeature<'g>>(
    graph: &Graph,
    views: Vec<W>,
    feature_type: &str,
) -> Result<Vec<W>> {
    let mut kept = Vec::with_capacity(views.len());
    for view in views {
        if type_matches(graph, view.feature_type()?.as_str(), feature_type) {
            kept.push(view);
        }
    }
    Ok(kept)
}
