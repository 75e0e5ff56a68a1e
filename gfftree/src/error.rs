//! Error type shared by every operation of the crate.
//!
//! All mutating operations validate before applying, so an `Err` always
//! means the store is unchanged.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatureTreeError {
    #[error("type '{type_name}' is not defined in the type schema")]
    NotInOntology { type_name: String },

    #[error("type '{child_type}' cannot be placed under '{parent_type}'")]
    TypeCompatibility {
        child_type:  String,
        parent_type: String,
    },

    #[error("type name '{name}' refers to more than one schema node: {candidates:?}")]
    AmbiguousType {
        name:       String,
        candidates: Vec<String>,
    },

    #[error("adding '{child}' as part of '{parent}' would create a cycle")]
    CyclicType { child: String, parent: String },

    #[error("type '{type_name}' is already defined")]
    TypeAlreadyDefined { type_name: String },

    #[error("expected the same non-zero number of ranges and phases, got {ranges} ranges and {phases} phases")]
    MixedMultiplicity { ranges: usize, phases: usize },

    #[error("range start {start} is greater than end {end}")]
    IllegalRange { start: u64, end: u64 },

    #[error("a feature with more than one range must have an ID")]
    DiscontinuousLacksId,

    #[error("ID '{id}' is already in use")]
    IdConflict { id: String },

    #[error("parent of type '{parent_type}' has no ID and cannot have children")]
    ParentLacksId { parent_type: String },

    #[error("cannot remove ID '{id}' from a feature that has children")]
    IdRequired { id: String },

    #[error("'{type_name}' features must have a phase for every range")]
    CdsUnspecifiedPhase { type_name: String },

    #[error("attribute '{tag}' is reserved and derived from the graph")]
    ReservedAttribute { tag: String },

    #[error("multiple parentage is disabled for this store")]
    MultipleParentage,

    #[error("index {index} is out of bounds for a feature with {multiplicity} ranges")]
    IndexOutOfBounds { index: usize, multiplicity: usize },

    #[error("access to a deleted feature")]
    DeletedAccess,

    #[error("graph topology changed during traversal (version {before} -> {after})")]
    ConcurrentModification { before: u64, after: u64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{}", format_parse_error(.line_number, .line, .corrected, .path, .hint))]
    Parse {
        line_number: usize,
        line:        String,
        corrected:   Option<String>,
        path:        Option<PathBuf>,
        hint:        String,
    },

    #[error("cannot decode '{text}': percent-decoded bytes are not valid UTF-8")]
    Encoding { text: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FeatureTreeError>;

impl FeatureTreeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FeatureTreeError::InvalidArgument(message.into())
    }
}

fn format_parse_error(
    line_number: &usize,
    line: &str,
    corrected: &Option<String>,
    path: &Option<PathBuf>,
    hint: &str,
) -> String {
    let location = match path {
        Some(path) => format!("{}:{}", path.display(), line_number),
        None => format!("line {}", line_number),
    };
    let mut message = format!("parse error at {location}: {hint}\n  line: {line}");
    if let Some(corrected) = corrected.as_ref().filter(|c| c.as_str() != line) {
        message.push_str(&format!("\n  after correction: {corrected}"));
    }
    message
}
