use indexmap::IndexMap;
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use super::enums::{
    Phase,
    Strand,
};
use super::typedef::{
    AttributeMap,
    FeatureStr,
    PosType,
    ScoreType,
    Span,
};
use crate::error::{
    FeatureTreeError,
    Result,
};
use crate::{
    getter_fn,
    with_field_fn,
};

pub const ID_TAG: &str = "ID";
pub const PARENT_TAG: &str = "Parent";
pub const NAME_TAG: &str = "Name";

/// Tags the store derives from its own structure and never keeps in the
/// attribute map.
pub fn is_reserved_tag(tag: &str) -> bool {
    tag == ID_TAG || tag == PARENT_TAG
}

/// Column data of one stored feature.
///
/// `ranges` and `phases` always have the same non-zero length. The natural
/// ID and parent links live on the graph node, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    seqid:        FeatureStr,
    source:       FeatureStr,
    feature_type: FeatureStr,
    ranges:       Vec<Span>,
    phases:       Vec<Phase>,
    score:        Option<ScoreType>,
    strand:       Strand,
    attributes:   AttributeMap,
}

impl FeatureRecord {
    getter_fn!(seqid, FeatureStr);

    getter_fn!(source, FeatureStr);

    getter_fn!(feature_type, FeatureStr);

    getter_fn!(ranges, Vec<Span>);

    getter_fn!(phases, Vec<Phase>);

    getter_fn!(attributes, AttributeMap);

    pub fn score(&self) -> Option<ScoreType> {
        self.score
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn multiplicity(&self) -> usize {
        self.ranges.len()
    }

    pub fn start(&self) -> PosType {
        self.ranges.iter().map(|r| r.start).min().unwrap_or_default()
    }

    pub fn end(&self) -> PosType {
        self.ranges.iter().map(|r| r.end).max().unwrap_or_default()
    }

    pub fn length(&self) -> PosType {
        Span::new(self.start(), self.end()).length()
    }

    pub fn names(&self) -> &[String] {
        self.attributes
            .get(NAME_TAG)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Range/phase pairs in stored order.
    pub fn segments(&self) -> impl Iterator<Item = (Span, Phase)> + '_ {
        self.ranges.iter().copied().zip(self.phases.iter().copied())
    }

    pub(crate) fn set_seqid(
        &mut self,
        seqid: FeatureStr,
    ) {
        self.seqid = seqid
    }

    pub(crate) fn set_source(
        &mut self,
        source: FeatureStr,
    ) {
        self.source = source
    }

    pub(crate) fn set_score(
        &mut self,
        score: Option<ScoreType>,
    ) {
        self.score = score
    }

    pub(crate) fn set_strand(
        &mut self,
        strand: Strand,
    ) {
        self.strand = strand
    }

    pub(crate) fn set_segments(
        &mut self,
        ranges: Vec<Span>,
        phases: Vec<Phase>,
    ) {
        debug_assert_eq!(ranges.len(), phases.len());
        self.ranges = ranges;
        self.phases = phases;
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }
}

/// Column data for a feature that is about to be inserted.
///
/// ```
/// use gfftree::prelude::*;
///
/// let exon = NewFeature::new("chr1", "havana", "exon", 100, 250)
///     .with_id("exon-1")
///     .with_attribute("Name", ["first"]);
/// assert_eq!(exon.ranges().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeature {
    seqid:        String,
    source:       String,
    feature_type: String,
    ranges:       Vec<Span>,
    phases:       Vec<Phase>,
    score:        Option<ScoreType>,
    strand:       Strand,
    attributes:   AttributeMap,
}

impl NewFeature {
    with_field_fn!(score, Option<ScoreType>);

    with_field_fn!(strand, Strand);

    with_field_fn!(ranges, Vec<Span>);

    with_field_fn!(phases, Vec<Phase>);

    getter_fn!(seqid, String);

    getter_fn!(source, String);

    getter_fn!(feature_type, String);

    getter_fn!(ranges, Vec<Span>);

    getter_fn!(phases, Vec<Phase>);

    getter_fn!(attributes, AttributeMap);

    /// A single-range feature with no score, no strand and an unspecified
    /// phase.
    pub fn new(
        seqid: impl Into<String>,
        source: impl Into<String>,
        feature_type: impl Into<String>,
        start: PosType,
        end: PosType,
    ) -> Self {
        Self {
            seqid:        seqid.into(),
            source:       source.into(),
            feature_type: feature_type.into(),
            ranges:       vec![Span::new(start, end)],
            phases:       vec![Phase::Unspecified],
            score:        None,
            strand:       Strand::NotStranded,
            attributes:   IndexMap::new(),
        }
    }

    /// Sets the phase of every range.
    pub fn with_phase(
        mut self,
        phase: Phase,
    ) -> Self {
        self.phases = vec![phase; self.ranges.len()];
        self
    }

    pub fn with_segments<I>(
        mut self,
        segments: I,
    ) -> Self
    where
        I: IntoIterator<Item = (Span, Phase)>, {
        (self.ranges, self.phases) = segments.into_iter().unzip();
        self
    }

    pub fn with_id(
        self,
        id: impl Into<String>,
    ) -> Self {
        self.with_attribute(ID_TAG, [id.into()])
    }

    /// Appends values to `tag`, creating it if needed.
    pub fn with_attribute<I, S>(
        mut self,
        tag: impl Into<String>,
        values: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>, {
        self.attributes
            .entry(tag.into())
            .or_default()
            .extend(values.into_iter().map_into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.attributes
            .get(ID_TAG)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Splits off the natural ID and checks the column data, returning the
    /// stored record.
    pub(crate) fn into_record(self) -> Result<(Option<String>, FeatureRecord)> {
        check_segments(&self.ranges, &self.phases)?;
        let mut attributes = self.attributes;
        if self.ranges.len() > 1 && !attributes.contains_key(ID_TAG) {
            return Err(FeatureTreeError::DiscontinuousLacksId);
        }
        if attributes.contains_key(PARENT_TAG) {
            return Err(FeatureTreeError::ReservedAttribute {
                tag: PARENT_TAG.to_string(),
            });
        }
        let id = match attributes.shift_remove(ID_TAG) {
            None => None,
            Some(mut values) if values.len() == 1 => values.pop(),
            Some(values) => {
                return Err(FeatureTreeError::invalid(format!(
                    "ID must have exactly one value, got {:?}",
                    values
                )))
            },
        };

        let record = FeatureRecord {
            seqid: FeatureStr::from(self.seqid),
            source: FeatureStr::from(self.source),
            feature_type: FeatureStr::from(self.feature_type),
            ranges: self.ranges,
            phases: self.phases,
            score: self.score,
            strand: self.strand,
            attributes,
        };
        Ok((id, record))
    }
}

/// Range/phase checks that do not depend on the schema.
pub(crate) fn check_segments(
    ranges: &[Span],
    phases: &[Phase],
) -> Result<()> {
    if ranges.is_empty() || ranges.len() != phases.len() {
        return Err(FeatureTreeError::MixedMultiplicity {
            ranges: ranges.len(),
            phases: phases.len(),
        });
    }
    if let Some(bad) = ranges.iter().find(|r| !r.is_valid()) {
        return Err(FeatureTreeError::IllegalRange {
            start: bad.start,
            end:   bad.end,
        });
    }
    Ok(())
}
