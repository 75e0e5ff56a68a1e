//! Core data structures of the store.
//!
//! - [`record`]: column data of a feature ([`FeatureRecord`]) and the
//!   insertion payload ([`NewFeature`]).
//! - [`schema`]: the type ontology ([`TypeSchema`]) deciding which feature
//!   types may nest inside which.
//! - [`graph`]: the node arena ([`Graph`]) with its indices, invariants and
//!   topology version.
//! - Column enumerations [`Strand`] and [`Phase`].
//! - [`typedef`]: coordinate, score and string aliases and [`Span`].

mod enums;
pub mod graph;
pub mod record;
pub mod schema;
pub mod typedef;

pub use enums::{
    Phase,
    Strand,
};
pub use graph::{
    Graph,
    NodeId,
};
pub use record::{
    FeatureRecord,
    NewFeature,
};
pub use schema::TypeSchema;
pub use typedef::Span;
