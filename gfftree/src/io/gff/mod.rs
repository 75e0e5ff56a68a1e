//! GFF3 reader and writer.
//!
//! The reader skips comments and blank lines, stops at `##FASTA`, and merges
//! rows that share an `ID` into one discontinuous feature. Parents must
//! appear before their children. Rows listing several parents either link
//! to all of them, when the store allows multiple parentage, or go through a
//! [`ParentResolver`].
//!
//! The writer emits `##gff-version 3` followed by one row per range of every
//! live feature in pre-order. Reserved bytes are percent-encoded on output
//! and decoded on input.

mod encoding;
mod read;
mod resolver;
mod row;

pub use encoding::{
    percent_decode,
    percent_encode,
};
pub use read::GffReaderBuilder;
pub use resolver::{
    Fallback,
    Leftmost,
    ParentResolver,
    Rightmost,
};
pub(crate) use row::{
    write_graph,
    write_node,
    write_subtree,
};
pub use row::GFF_HEADER;
