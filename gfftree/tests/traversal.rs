use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

use gfftree::prelude::*;
use rstest::{
    fixture,
    rstest,
};

mod common;
use common::{
    init_logger,
    SyntheticGenome,
};

const SHAPE: SyntheticGenome = SyntheticGenome {
    n_genes:       60,
    n_transcripts: 3,
    n_exons:       8,
};

#[fixture]
fn genome() -> MutableGenome {
    init_logger();
    SHAPE.build().unwrap()
}

fn is_type<'g>(
    feature: impl ReadFeature<'g>,
    wanted: &str,
) -> bool {
    feature
        .feature_type()
        .map(|t| t.as_str() == wanted)
        .unwrap_or(false)
}

#[rstest]
fn test_parallel_sum_matches_sequential(genome: MutableGenome) -> anyhow::Result<()> {
    assert_eq!(genome.feature_count(), SHAPE.n_features());

    let exon_bases = |f: MutableFeature<'_>| -> Result<PosType> {
        Ok(match f.feature_type()?.as_str() {
            "exon" => f.length()?,
            _ => 0,
        })
    };
    let parallel = genome.sum_of(exon_bases)?;

    let mut sequential = 0;
    for exon in genome.descendants_of_type("exon")? {
        sequential += exon.length()?;
    }
    assert_eq!(parallel, sequential);
    assert_eq!(
        parallel,
        (SHAPE.n_genes * SHAPE.n_transcripts * SHAPE.n_exons) as PosType
            * SyntheticGenome::EXON_LENGTH
    );

    let count = genome.reduce(|_| Ok(1usize), |a, b| Ok(a + b))?;
    assert_eq!(count, SHAPE.n_features());
    Ok(())
}

#[rstest]
fn test_ordered_results_are_deterministic(genome: MutableGenome) -> anyhow::Result<()> {
    let preorder = genome.descendants()?;
    let first_cds = preorder
        .iter()
        .copied()
        .find(|f| is_type(*f, "CDS"));

    for _ in 0..10 {
        let found = genome.find(|f| Ok(f.feature_type()?.as_str() == "CDS"))?;
        assert_eq!(found, first_cds);

        let listed = genome.filtered_list(|f| Ok(f.feature_type()?.as_str() == "mRNA"))?;
        assert_eq!(listed, genome.descendants_of_type("mRNA")?);
    }
    Ok(())
}

#[rstest]
fn test_group_and_associate(genome: MutableGenome) -> anyhow::Result<()> {
    let by_seqid = genome.group_by(|f| Ok(f.seqid()?.to_string()))?;
    assert_eq!(by_seqid.len(), 3);
    let per_gene = SHAPE.n_features() / SHAPE.n_genes;
    for (seqid, features) in &by_seqid {
        assert_eq!(features.len(), SHAPE.n_genes / 3 * per_gene, "{seqid}");
    }

    let genes = genome.filtered_list(|f| Ok(f.feature_type()?.as_str() == "gene"))?;
    assert_eq!(genes, genome.children()?);

    let ids = genome.associate_by(|f| Ok(f.id()?.map(|id| id.to_string())))?;
    let mrna = ids.get(&Some("g7.t2".to_string())).copied();
    assert_eq!(mrna, genome.by_id("g7.t2"));
    assert!(genome.any(|f| Ok(f.strand()? == Strand::Minus))?);
    assert!(!genome.all(|f| Ok(f.strand()? == Strand::Minus))?);
    Ok(())
}

#[rstest]
fn test_filter_removes_coding_ranges(genome: MutableGenome) -> anyhow::Result<()> {
    let removed = genome.filter(|f| Ok(f.feature_type()?.as_str() != "CDS"))?;
    assert_eq!(removed, SHAPE.n_genes * SHAPE.n_transcripts);
    assert_eq!(
        genome.feature_count(),
        SHAPE.n_features() - SHAPE.n_genes * SHAPE.n_transcripts
    );
    assert!(genome.descendants_of_type("CDS")?.is_empty());
    assert!(genome.by_id("g0.t0").is_some());
    Ok(())
}

#[rstest]
fn test_insert_during_traversal_is_detected(genome: MutableGenome) {
    let err = genome
        .for_each(|f| {
            if f.id()?.is_some_and(|id| id.as_str() == "g3") {
                f.insert(NewFeature::new("chr1", "late", "mRNA", 1, 10))?;
            }
            Ok(())
        })
        .unwrap_err();
    assert!(
        matches!(err, FeatureTreeError::ConcurrentModification { .. }),
        "{err}"
    );
}

#[rstest]
fn test_attribute_edits_during_traversal(genome: MutableGenome) -> anyhow::Result<()> {
    let before = genome.topology_version();
    let visits = AtomicUsize::new(0);
    genome.for_each(|f| {
        visits.fetch_add(1, Ordering::Relaxed);
        f.set_attribute("visited", "yes")
    })?;
    assert_eq!(visits.into_inner(), SHAPE.n_features());
    assert_eq!(genome.topology_version(), before);
    assert!(genome.all(|f| Ok(f.attribute("visited")? == vec!["yes"]))?);
    Ok(())
}

#[rstest]
fn test_subtree_traversal(genome: MutableGenome) -> anyhow::Result<()> {
    let gene = genome.by_id("g5").unwrap();
    let below = gene.sum_of(|_| Ok(1usize))?;
    assert_eq!(below, SHAPE.n_features() / SHAPE.n_genes);

    let transcript = genome.by_id("g5.t1").unwrap();
    let exons = transcript.children_of_type("exon")?;
    assert_eq!(exons.len(), SHAPE.n_exons);
    assert!(exons.iter().all(|e| is_type(e.as_feature(), "exon")));
    Ok(())
}
