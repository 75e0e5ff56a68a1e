use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
};
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use itertools::Itertools;
use log::{
    debug,
    info,
};

use super::encoding::percent_decode;
use super::resolver::ParentResolver;
use crate::data_structs::record::{
    ID_TAG,
    PARENT_TAG,
};
use crate::data_structs::typedef::{
    AttributeMap,
    PosType,
    ScoreType,
    Span,
};
use crate::data_structs::{
    Graph,
    NewFeature,
    NodeId,
    Phase,
    Strand,
    TypeSchema,
};
use crate::error::{
    FeatureTreeError,
    Result,
};
use crate::facade::{
    Feature,
    Genome,
    MutableGenome,
    Wrap,
};

const FASTA_DIRECTIVE: &str = "##FASTA";
const N_COLUMNS: usize = 9;

type TextCorrector = Box<dyn Fn(&str) -> String + Send + Sync>;
type SchemaModifier = Box<dyn FnOnce(&mut TypeSchema) -> Result<()> + Send>;

/// Settings for reading GFF3 into a store.
///
/// ```no_run
/// use gfftree::prelude::*;
///
/// let genome = GffReaderBuilder::default()
///     .with_text_corrector(|line: &str| line.replace("five_prime_utr", "five_prime_UTR"))
///     .with_parent_resolver(Rightmost)
///     .with_schema_modifier(|schema: &mut TypeSchema| {
///         schema.define_type("polypeptide", &[], &[], &[], &["mRNA"])
///     })
///     .build_genome("annotation.gff3")?;
/// # Ok::<(), FeatureTreeError>(())
/// ```
#[derive(Default)]
pub struct GffReaderBuilder {
    text_corrector:     Option<TextCorrector>,
    parent_resolver:    Option<Box<dyn ParentResolver>>,
    multiple_parentage: bool,
    schema_modifier:    Option<SchemaModifier>,
}

impl GffReaderBuilder {
    /// Rewrites every data line before it is parsed. Parse errors report
    /// both the raw and the corrected text.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub fn with_text_corrector<F>(
        mut self,
        corrector: F,
    ) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static, {
        self.text_corrector = Some(Box::new(corrector));
        self
    }

    /// Chooses one parent when a row lists several and multiple parentage
    /// is off. Without a resolver such rows are rejected.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub fn with_parent_resolver<R>(
        mut self,
        resolver: R,
    ) -> Self
    where
        R: ParentResolver + 'static, {
        self.parent_resolver = Some(Box::new(resolver));
        self
    }

    /// Links every listed parent instead of resolving to one.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub fn with_multiple_parentage(
        mut self,
        multiple_parentage: bool,
    ) -> Self {
        self.multiple_parentage = multiple_parentage;
        self
    }

    /// Edits the seed schema before any row is read.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub fn with_schema_modifier<F>(
        mut self,
        modifier: F,
    ) -> Self
    where
        F: FnOnce(&mut TypeSchema) -> Result<()> + Send + 'static, {
        self.schema_modifier = Some(Box::new(modifier));
        self
    }

    pub fn build_genome(
        self,
        path: impl AsRef<Path>,
    ) -> Result<Genome> {
        Ok(Genome::from_graph(self.read_file(path.as_ref())?))
    }

    pub fn build_mutable(
        self,
        path: impl AsRef<Path>,
    ) -> Result<MutableGenome> {
        Ok(MutableGenome::from_graph(self.read_file(path.as_ref())?))
    }

    /// Reads from any buffered source. `label` names it in parse errors.
    pub fn read_mutable<R: BufRead>(
        self,
        reader: R,
        label: Option<&Path>,
    ) -> Result<MutableGenome> {
        Ok(MutableGenome::from_graph(self.read_graph(reader, label)?))
    }

    fn read_file(
        self,
        path: &Path,
    ) -> Result<Graph> {
        let reader = BufReader::new(File::open(path)?);
        self.read_graph(reader, Some(path))
    }

    pub(crate) fn read_graph<R: BufRead>(
        self,
        reader: R,
        label: Option<&Path>,
    ) -> Result<Graph> {
        let mut schema = TypeSchema::default();
        if let Some(modifier) = self.schema_modifier {
            modifier(&mut schema)?;
        }
        let graph = Graph::new(schema, self.multiple_parentage);
        let resolver = self.parent_resolver.as_deref();

        let mut n_rows = 0usize;
        for (idx, line) in reader.lines().enumerate() {
            let raw = line?;
            if raw.trim().is_empty() {
                continue;
            }
            if raw.starts_with(FASTA_DIRECTIVE) {
                debug!("Stopped at FASTA section on line {}", idx + 1);
                break;
            }
            if raw.starts_with('#') {
                continue;
            }

            let corrected = self.text_corrector.as_ref().map(|fix| fix(&raw));
            let text = corrected.as_deref().unwrap_or(&raw);
            let context = |hint: String| {
                FeatureTreeError::Parse {
                    line_number: idx + 1,
                    line: raw.clone(),
                    corrected: corrected.clone(),
                    path: label.map(Path::to_path_buf),
                    hint,
                }
            };

            let row = Row::parse(text).map_err(&context)?;
            add_row(&graph, row, text, resolver).map_err(|err| context(err.to_string()))?;
            n_rows += 1;
        }
        info!(
            "Read {} GFF3 rows into {} features{}",
            n_rows,
            graph.len(),
            label
                .map(|path| format!(" from {}", path.display()))
                .unwrap_or_default()
        );
        Ok(graph)
    }
}

/// One parsed data line.
#[derive(Debug, Clone, PartialEq)]
struct Row {
    seqid:        String,
    source:       String,
    feature_type: String,
    span:         Span,
    score:        Option<ScoreType>,
    strand:       Strand,
    phase:        Phase,
    id:           Option<String>,
    parents:      Vec<String>,
    attributes:   AttributeMap,
}

impl Row {
    fn parse(line: &str) -> std::result::Result<Self, String> {
        let columns = line.split('\t').collect_vec();
        if columns.len() != N_COLUMNS {
            return Err(format!(
                "expected {N_COLUMNS} tab-separated columns, found {}",
                columns.len()
            ));
        }
        let decode = |text: &str| percent_decode(text).map_err(|err| err.to_string());

        let start = parse_position(columns[3], "start")?;
        let end = parse_position(columns[4], "end")?;
        let score = match columns[5] {
            "." => None,
            text => {
                Some(
                    text.parse::<ScoreType>()
                        .map_err(|_| format!("invalid score '{text}'"))?,
                )
            },
        };
        let strand = Strand::from_str(columns[6]).map_err(|err| err.to_string())?;
        let phase = Phase::from_str(columns[7]).map_err(|err| err.to_string())?;

        let mut attributes: AttributeMap = IndexMap::new();
        let mut id = None;
        let mut parents = Vec::new();
        for pair in columns[8]
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty() && *pair != ".")
        {
            let (tag, values) = pair
                .split_once('=')
                .ok_or_else(|| format!("attribute '{pair}' is not of the form tag=value"))?;
            let tag = decode(tag)?;
            let values = values
                .split(',')
                .map(decode)
                .collect::<std::result::Result<Vec<String>, String>>()?;
            match tag.as_str() {
                ID_TAG if values.len() == 1 && id.is_none() => id = values.into_iter().next(),
                ID_TAG => return Err("ID must appear once with exactly one value".to_string()),
                PARENT_TAG => parents.extend(values),
                _ => attributes.entry(tag).or_default().extend(values),
            }
        }

        Ok(Self {
            seqid: decode(columns[0])?,
            source: decode(columns[1])?,
            feature_type: decode(columns[2])?,
            span: Span::new(start, end),
            score,
            strand,
            phase,
            id,
            parents: parents.into_iter().unique().collect(),
            attributes,
        })
    }

    fn into_feature(self) -> NewFeature {
        let mut feature = NewFeature::new(
            self.seqid,
            self.source,
            self.feature_type,
            self.span.start,
            self.span.end,
        )
        .with_score(self.score)
        .with_strand(self.strand)
        .with_phase(self.phase);
        if let Some(id) = self.id {
            feature = feature.with_id(id);
        }
        for (tag, values) in self.attributes {
            feature = feature.with_attribute(tag, values);
        }
        feature
    }
}

fn parse_position(
    text: &str,
    column: &str,
) -> std::result::Result<PosType, String> {
    text.parse::<PosType>()
        .map_err(|_| format!("invalid {column} position '{text}'"))
}

fn add_row(
    graph: &Graph,
    row: Row,
    line: &str,
    resolver: Option<&dyn ParentResolver>,
) -> Result<()> {
    if let Some(existing) = row.id.as_deref().and_then(|id| graph.by_id(id)) {
        return merge_row(graph, existing, row);
    }

    let parents = row
        .parents
        .iter()
        .map(|parent| {
            graph.by_id(parent).ok_or_else(|| {
                FeatureTreeError::invalid(format!(
                    "parent '{parent}' is not defined before this line"
                ))
            })
        })
        .collect::<Result<Vec<NodeId>>>()?;
    let feature = row.into_feature();

    match parents.as_slice() {
        [] => graph.insert(NodeId::ROOT, feature).map(|_| ()),
        [parent] => graph.insert(*parent, feature).map(|_| ()),
        [first, rest @ ..] if graph.multiple_parentage() => {
            let node = graph.insert(*first, feature)?;
            for parent in rest {
                if let Err(err) = graph.add_parent(node, *parent) {
                    graph.delete(node)?;
                    return Err(err);
                }
            }
            Ok(())
        },
        _ => {
            let resolver = resolver.ok_or_else(|| {
                FeatureTreeError::invalid(format!(
                    "{} parents listed but multiple parentage is disabled and no parent resolver \
                     is set",
                    parents.len()
                ))
            })?;
            let candidates = parents
                .iter()
                .map(|parent| Feature::wrap(graph, *parent))
                .collect_vec();
            let chosen = resolver
                .resolve(line, &candidates)
                .filter(|idx| *idx < parents.len())
                .ok_or_else(|| FeatureTreeError::invalid("parent resolver made no choice"))?;
            graph.insert(parents[chosen], feature).map(|_| ())
        },
    }
}

/// Folds a repeated-ID row into the existing feature as one more range.
fn merge_row(
    graph: &Graph,
    node: NodeId,
    row: Row,
) -> Result<()> {
    let same_columns = graph.with_record(node, |r| {
        r.seqid().as_str() == row.seqid
            && r.feature_type().as_str() == row.feature_type
            && r.strand() == row.strand
    })?;
    let parent_ids = graph.parent_ids(node)?;
    let same_parents = parent_ids.is_empty() == row.parents.is_empty()
        && parent_ids
            .iter()
            .all(|id| row.parents.iter().any(|p| p.as_str() == id.as_str()))
        && (!graph.multiple_parentage() || parent_ids.len() == row.parents.len());
    if !same_columns || !same_parents {
        return Err(FeatureTreeError::invalid(format!(
            "rows sharing ID '{}' must agree on seqid, type, strand and parents",
            row.id.unwrap_or_default()
        )));
    }

    graph.update_segments(node, |r| {
        let mut ranges = r.ranges().clone();
        let mut phases = r.phases().clone();
        ranges.push(row.span);
        phases.push(row.phase);
        Ok((ranges, phases))
    })?;
    for (tag, values) in row.attributes {
        graph.update_attributes(node, &tag, |attrs| {
            let merged = attrs.entry(tag.clone()).or_default();
            for value in values {
                if !merged.contains(&value) {
                    merged.push(value);
                }
            }
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_all_columns() {
        let row = Row::parse(
            "chr1\thavana\tmRNA\t10\t200\t0.5\t-\t.\tID=tx1;Parent=g1,g2;Name=a%3Bb,c;note=x",
        )
        .unwrap();
        assert_eq!(row.seqid, "chr1");
        assert_eq!(row.span, Span::new(10, 200));
        assert_eq!(row.score, Some(0.5));
        assert_eq!(row.strand, Strand::Minus);
        assert_eq!(row.phase, Phase::Unspecified);
        assert_eq!(row.id.as_deref(), Some("tx1"));
        assert_eq!(row.parents, vec!["g1", "g2"]);
        assert_eq!(row.attributes["Name"], vec!["a;b", "c"]);
        assert_eq!(row.attributes.keys().collect_vec(), vec!["Name", "note"]);
    }

    #[rstest]
    #[case::empty_column9("chr1\tsrc\tgene\t1\t5\t.\t+\t.\t.")]
    #[case::trailing_semicolon("chr1\tsrc\tgene\t1\t5\t.\t+\t.\tnote=x;")]
    fn accepts_lenient_attributes(#[case] line: &str) {
        assert!(Row::parse(line).is_ok());
    }

    #[rstest]
    #[case::eight_columns("chr1\tsrc\tgene\t1\t5\t.\t+\t.", "columns")]
    #[case::bad_start("chr1\tsrc\tgene\tx\t5\t.\t+\t.\t.", "start")]
    #[case::bad_score("chr1\tsrc\tgene\t1\t5\thigh\t+\t.\t.", "score")]
    #[case::bad_strand("chr1\tsrc\tgene\t1\t5\t.\t*\t.\t.", "strand")]
    #[case::bare_tag("chr1\tsrc\tgene\t1\t5\t.\t+\t.\tnote", "tag=value")]
    #[case::two_ids("chr1\tsrc\tgene\t1\t5\t.\t+\t.\tID=a,b", "ID")]
    fn rejects_malformed_rows(
        #[case] line: &str,
        #[case] hint: &str,
    ) {
        let err = Row::parse(line).unwrap_err();
        assert!(err.contains(hint), "{err}");
    }
}
