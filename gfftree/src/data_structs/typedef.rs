use std::fmt::Display;

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};

/// Shared, cheaply clonable string used for seqids, sources and types.
pub type FeatureStr = ArcStr;
pub type PosType = u64;
pub type ScoreType = f64;

/// Insertion-ordered `tag -> values` multimap of column 9.
pub type AttributeMap = IndexMap<String, Vec<String>>;

/// 1-based, inclusive coordinate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: PosType,
    pub end:   PosType,
}

impl Span {
    pub fn new(
        start: PosType,
        end: PosType,
    ) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Number of bases covered, zero for an inverted range. Saturates at
    /// `PosType::MAX` for `0..=PosType::MAX`.
    pub fn length(&self) -> PosType {
        match self.is_valid() {
            true => (self.end - self.start).saturating_add(1),
            false => 0,
        }
    }
}

impl From<(PosType, PosType)> for Span {
    fn from(value: (PosType, PosType)) -> Self {
        Span::new(value.0, value.1)
    }
}

impl From<std::ops::RangeInclusive<PosType>> for Span {
    fn from(value: std::ops::RangeInclusive<PosType>) -> Self {
        Span::new(*value.start(), *value.end())
    }
}

impl Display for Span {
    #[cfg_attr(coverage_nightly, coverage(off))]
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
