use std::fmt::{
    Debug,
    Display,
};
use std::hash::{
    Hash,
    Hasher,
};

use super::private::{
    Anchored,
    Wrap,
};
use super::{
    ReadFeature,
    ReadParent,
    WriteFeature,
    WriteParent,
};
use crate::data_structs::{
    Graph,
    NodeId,
};

macro_rules! feature_view {
    ($name: ident) => {
        impl<'g> Anchored<'g> for $name<'g> {
            fn graph(self) -> &'g Graph {
                self.graph
            }

            fn anchor(self) -> NodeId {
                self.node
            }
        }

        impl<'g> Wrap<'g> for $name<'g> {
            fn wrap(
                graph: &'g Graph,
                node: NodeId,
            ) -> Self {
                Self { graph, node }
            }
        }

        impl<'g> ReadFeature<'g> for $name<'g> {}

        impl<'g> ReadParent<'g> for $name<'g> {
            type View = $name<'g>;
        }

        /// Handles are equal when they point at the same slot of the same
        /// graph.
        impl PartialEq for $name<'_> {
            fn eq(
                &self,
                other: &Self,
            ) -> bool {
                std::ptr::eq(self.graph, other.graph) && self.node == other.node
            }
        }

        impl Eq for $name<'_> {}

        impl Hash for $name<'_> {
            fn hash<H: Hasher>(
                &self,
                state: &mut H,
            ) {
                std::ptr::hash(self.graph, state);
                self.node.hash(state);
            }
        }

        impl Debug for $name<'_> {
            #[cfg_attr(coverage_nightly, coverage(off))]
            fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
            ) -> std::fmt::Result {
                match (self.feature_type(), self.id()) {
                    (Ok(kind), Ok(Some(id))) => {
                        write!(f, "{}({} {} {})", stringify!($name), self.node, kind, id)
                    },
                    (Ok(kind), Ok(None)) => {
                        write!(f, "{}({} {})", stringify!($name), self.node, kind)
                    },
                    _ => write!(f, "{}({} deleted)", stringify!($name), self.node),
                }
            }
        }

        /// GFF3 rows of the feature, or a placeholder once deleted.
        impl Display for $name<'_> {
            fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
            ) -> std::fmt::Result {
                match self.as_row() {
                    Ok(row) => write!(f, "{}", row.trim_end()),
                    Err(_) => write!(f, "<deleted feature {}>", self.node),
                }
            }
        }
    };
}

/// Read-only handle to one feature.
#[derive(Clone, Copy)]
pub struct Feature<'g> {
    graph: &'g Graph,
    node:  NodeId,
}

/// Read-write handle to one feature.
#[derive(Clone, Copy)]
pub struct MutableFeature<'g> {
    graph: &'g Graph,
    node:  NodeId,
}

feature_view!(Feature);
feature_view!(MutableFeature);

impl<'g> WriteFeature<'g> for MutableFeature<'g> {}

impl<'g> WriteParent<'g> for MutableFeature<'g> {}

impl<'g> MutableFeature<'g> {
    /// Read-only view of the same feature.
    pub fn as_feature(self) -> Feature<'g> {
        Feature {
            graph: self.graph,
            node:  self.node,
        }
    }
}

impl<'g> From<MutableFeature<'g>> for Feature<'g> {
    fn from(value: MutableFeature<'g>) -> Self {
        value.as_feature()
    }
}
