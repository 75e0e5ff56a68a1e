pub use crate::data_structs::record::{
    FeatureRecord,
    NewFeature,
    ID_TAG,
    NAME_TAG,
    PARENT_TAG,
};
pub use crate::data_structs::typedef::{
    AttributeMap,
    FeatureStr,
    PosType,
    ScoreType,
    Span,
};
pub use crate::data_structs::{
    Phase,
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
    ReadFeature,
    ReadGenome,
    ReadParent,
    WriteFeature,
    WriteParent,
};
pub use crate::io::gff::{
    GffReaderBuilder,
    Leftmost,
    ParentResolver,
    Rightmost,
};
