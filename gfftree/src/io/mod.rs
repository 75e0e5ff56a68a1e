//! Reading and writing annotation text.

pub mod gff;
