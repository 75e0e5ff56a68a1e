//! # gfftree
//!
//! `gfftree` keeps genome annotations (genes, transcripts, exons, ...) in
//! memory as a typed hierarchy and reads and writes them as GFF3.
//!
//! ## Key Features
//!
//! * **Validated structure**: every insertion is checked against a
//!   [`TypeSchema`] that says which feature types may sit inside which. The
//!   schema starts from a small seed ontology and can be extended at
//!   runtime.
//! * **Discontinuous features**: one feature may span several ranges, each
//!   with its own phase, as CDS rows sharing an `ID` do in GFF3.
//! * **Parallel traversal**: `for_each`, `reduce`, `find`, `group_by` and the
//!   other bulk operations visit child subtrees concurrently on a rayon
//!   pool, children before parents.
//! * **Read/write split**: [`Genome`] and [`Feature`] only read;
//!   [`MutableGenome`] and [`MutableFeature`] also write. Converting between
//!   the two store types always deep-copies.
//!
//! The traversal pool size can be set with the `GFFTREE_NUM_THREADS`
//! environment variable.
//!
//! ## Structure
//!
//! * [`data_structs`]: records, the type schema and the node graph.
//! * [`facade`]: the feature and genome views with their capability traits.
//! * [`io`]: the GFF3 reader and writer.
//! * [`error`]: the crate error type.
//! * [`utils`]: the traversal pool and builder macros.
//!
//! ## Usage
//!
//! ```
//! use gfftree::prelude::*;
//!
//! let text = "##gff-version 3\n\
//!             chr1\tsrc\tgene\t1\t1000\t.\t+\t.\tID=g1\n\
//!             chr1\tsrc\tmRNA\t1\t1000\t.\t+\t.\tID=tx1;Parent=g1\n\
//!             chr1\tsrc\texon\t1\t200\t.\t+\t.\tParent=tx1\n";
//! let genome: MutableGenome = text.parse()?;
//!
//! let exon_bases: u64 = genome.sum_of(|f| {
//!     Ok(match f.feature_type()?.as_str() {
//!         "exon" => f.length()?,
//!         _ => 0,
//!     })
//! })?;
//! assert_eq!(exon_bases, 200);
//!
//! let transcript = genome.by_id("tx1").expect("tx1 was read");
//! transcript.insert(NewFeature::new("chr1", "src", "CDS", 50, 200).with_phase(Phase::Zero))?;
//! assert_eq!(genome.descendants_of_type("CDS")?.len(), 1);
//! # Ok::<(), FeatureTreeError>(())
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod data_structs;
pub mod error;
pub mod facade;
pub mod io;
pub mod prelude;
pub(crate) mod traverse;
pub mod utils;

pub use crate::data_structs::{
    FeatureRecord,
    NewFeature,
    Phase,
    Span,
    Strand,
    TypeSchema,
};
pub use crate::error::{
    FeatureTreeError,
    Result,
};
pub use crate::facade::{
    Feature,
    Genome,
    MutableFeature,
    MutableGenome,
};
pub use crate::io::gff::GffReaderBuilder;
