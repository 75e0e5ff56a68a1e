use std::fmt::Display;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use super::private::Anchored;
use super::{
    Feature,
    MutableFeature,
    ReadGenome,
    ReadParent,
    WriteParent,
};
use crate::data_structs::{
    Graph,
    NodeId,
};
use crate::error::{
    FeatureTreeError,
    Result,
};
use crate::io::gff::{
    self,
    GffReaderBuilder,
};

/// Read-only annotation store.
#[derive(Debug, Default)]
pub struct Genome {
    graph: Graph,
}

/// Read-write annotation store. Schema edits go through this type.
#[derive(Debug, Default)]
pub struct MutableGenome {
    graph: Graph,
}

macro_rules! genome_view {
    ($name: ident, $view: ident) => {
        impl<'g> Anchored<'g> for &'g $name {
            fn graph(self) -> &'g Graph {
                &self.graph
            }

            fn anchor(self) -> NodeId {
                NodeId::ROOT
            }
        }

        impl<'g> ReadParent<'g> for &'g $name {
            type View = $view<'g>;
        }

        impl<'g> ReadGenome<'g> for &'g $name {}

        impl $name {
            pub(crate) fn from_graph(graph: Graph) -> Self {
                Self { graph }
            }

            /// Reads a GFF3 file with the default reader settings.
            pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
                let path = path.as_ref();
                let reader = std::io::BufReader::new(std::fs::File::open(path)?);
                Self::from_reader(reader, Some(path))
            }

            /// Reads GFF3 text from `reader`. `label` names the source in
            /// parse errors.
            pub fn from_reader<R: BufRead>(
                reader: R,
                label: Option<&Path>,
            ) -> Result<Self> {
                let graph = GffReaderBuilder::default().read_graph(reader, label)?;
                Ok(Self::from_graph(graph))
            }

            /// Deep copy as a read-only store.
            pub fn immutable(&self) -> Genome {
                Genome::from_graph(self.graph.copy())
            }

            /// Deep copy as a read-write store.
            pub fn mutable(&self) -> MutableGenome {
                MutableGenome::from_graph(self.graph.copy())
            }
        }

        /// Deep copy holding only live features.
        impl Clone for $name {
            fn clone(&self) -> Self {
                Self::from_graph(self.graph.copy())
            }
        }

        /// The whole store as GFF3 text.
        impl Display for $name {
            fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
            ) -> std::fmt::Result {
                let mut buf = Vec::new();
                gff::write_graph(&self.graph, &mut buf).map_err(|_| std::fmt::Error)?;
                f.write_str(&String::from_utf8_lossy(&buf))
            }
        }

        impl FromStr for $name {
            type Err = FeatureTreeError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_reader(s.as_bytes(), None)
            }
        }
    };
}

genome_view!(Genome, Feature);
genome_view!(MutableGenome, MutableFeature);

impl<'g> WriteParent<'g> for &'g MutableGenome {}

impl MutableGenome {
    /// Empty store with the seed schema.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Empty store whose features may have several parents. Traversal is
    /// unavailable on such a store.
    pub fn with_multiple_parentage() -> Self {
        Self::from_graph(Graph::new(Default::default(), true))
    }

    /// Adds a type to the schema. `id` and `exact_synonyms` become exact
    /// names of the new type; `is_a` and `part_of` must name known types.
    pub fn define_type(
        &self,
        id: &str,
        exact_synonyms: &[&str],
        rough_synonyms: &[&str],
        is_a: &[&str],
        part_of: &[&str],
    ) -> Result<()> {
        self.graph
            .schema_mut()
            .define_type(id, exact_synonyms, rough_synonyms, is_a, part_of)
    }

    pub fn add_part_of(
        &self,
        child: &str,
        parent: &str,
    ) -> Result<()> {
        self.graph.schema_mut().add_part_of(child, parent)
    }

    pub fn add_is_a(
        &self,
        sub_type: &str,
        super_type: &str,
    ) -> Result<()> {
        self.graph.schema_mut().add_is_a(sub_type, super_type)
    }

    pub fn add_synonym(
        &self,
        existing: &str,
        synonym: &str,
    ) -> Result<()> {
        self.graph.schema_mut().add_synonym(existing, synonym)
    }

    pub fn add_rough_synonym(
        &self,
        existing: &str,
        synonym: &str,
    ) -> Result<()> {
        self.graph
            .schema_mut()
            .add_rough_synonym(existing, synonym)
    }
}
