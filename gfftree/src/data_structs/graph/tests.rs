use rstest::{
    fixture,
    rstest,
};

use super::*;
use crate::data_structs::Strand;

fn gene(id: &str) -> NewFeature {
    NewFeature::new("chr1", "test", "gene", 100, 900)
        .with_strand(Strand::Plus)
        .with_id(id)
}

/// gene1 -> mrna1 -> {exon1, cds1}
#[fixture]
fn small() -> (Graph, [NodeId; 4]) {
    let graph = Graph::default();
    let gene = graph.insert(NodeId::ROOT, gene("gene1")).unwrap();
    let mrna = graph
        .insert(
            gene,
            NewFeature::new("chr1", "test", "mRNA", 100, 900)
                .with_id("mrna1")
                .with_attribute("Name", ["tx"]),
        )
        .unwrap();
    let exon = graph
        .insert(
            mrna,
            NewFeature::new("chr1", "test", "exon", 100, 300).with_id("exon1"),
        )
        .unwrap();
    let cds = graph
        .insert(
            mrna,
            NewFeature::new("chr1", "test", "CDS", 150, 300).with_phase(Phase::Zero),
        )
        .unwrap();
    (graph, [gene, mrna, exon, cds])
}

#[rstest]
fn test_insert_links_both_ways(small: (Graph, [NodeId; 4])) {
    let (graph, [gene, mrna, exon, cds]) = small;
    assert_eq!(graph.children(NodeId::ROOT).unwrap(), vec![gene]);
    assert_eq!(graph.children(mrna).unwrap(), vec![exon, cds]);
    assert_eq!(graph.parents(exon).unwrap(), vec![mrna]);
    assert!(graph.parents(gene).unwrap().is_empty());
    assert_eq!(graph.parent_ids(cds).unwrap(), vec![FeatureStr::from("mrna1")]);
    assert_eq!(graph.by_id("exon1"), Some(exon));
    assert_eq!(graph.by_name("tx"), vec![mrna]);
    assert_eq!(graph.len(), 4);
    assert_eq!(graph.topology_version(), 4);
}

#[rstest]
#[case::exon_at_root(NodeId::ROOT, NewFeature::new("c", "s", "exon", 1, 2))]
#[case::gene_under_mrna(NodeId(2), gene("gene2"))]
fn test_type_compatibility(
    small: (Graph, [NodeId; 4]),
    #[case] parent: NodeId,
    #[case] feature: NewFeature,
) {
    let (graph, _) = small;
    let before = graph.topology_version();
    let result = graph.insert(parent, feature);
    assert!(matches!(
        result,
        Err(FeatureTreeError::TypeCompatibility { .. })
    ));
    assert_eq!(graph.topology_version(), before);
}

#[rstest]
fn test_unknown_types(small: (Graph, [NodeId; 4])) {
    let (graph, [_, mrna, ..]) = small;
    let top = graph.insert(
        NodeId::ROOT,
        NewFeature::new("chr1", "test", "widget", 1, 10).with_id("w"),
    );
    assert!(top.is_ok());

    let nested = graph.insert(mrna, NewFeature::new("chr1", "test", "widget", 1, 10));
    assert!(matches!(
        nested,
        Err(FeatureTreeError::NotInOntology { .. })
    ));
}

#[rstest]
fn test_insert_validation(small: (Graph, [NodeId; 4])) {
    let (graph, [gene, mrna, _, cds]) = small;

    let mixed = NewFeature::new("chr1", "t", "exon", 1, 5)
        .with_id("e")
        .with_phases(vec![Phase::Zero, Phase::One]);
    assert!(matches!(
        graph.insert(mrna, mixed),
        Err(FeatureTreeError::MixedMultiplicity { ranges: 1, phases: 2 })
    ));

    let inverted = NewFeature::new("chr1", "t", "exon", 10, 5);
    assert!(matches!(
        graph.insert(mrna, inverted),
        Err(FeatureTreeError::IllegalRange { start: 10, end: 5 })
    ));

    let unphased = NewFeature::new("chr1", "t", "CDS", 1, 5);
    assert!(matches!(
        graph.insert(mrna, unphased),
        Err(FeatureTreeError::CdsUnspecifiedPhase { .. })
    ));

    let split = NewFeature::new("chr1", "t", "exon", 1, 5)
        .with_segments([(Span::new(1, 5), Phase::Unspecified), (Span::new(9, 12), Phase::Unspecified)]);
    assert!(matches!(
        graph.insert(mrna, split),
        Err(FeatureTreeError::DiscontinuousLacksId)
    ));

    let before = graph.topology_version();
    let holder = graph.by_id("exon1");
    let duplicate = NewFeature::new("chr1", "t", "mRNA", 1, 5)
        .with_id("exon1")
        .with_attribute("Name", ["dup"]);
    assert!(matches!(
        graph.insert(gene, duplicate),
        Err(FeatureTreeError::IdConflict { .. })
    ));
    assert_eq!(graph.topology_version(), before);
    assert_eq!(graph.by_id("exon1"), holder);
    assert!(graph.by_name("dup").is_empty());
    assert_eq!(graph.children(gene).unwrap(), vec![mrna]);

    let parent_tag = NewFeature::new("chr1", "t", "exon", 1, 5).with_attribute("Parent", ["mrna1"]);
    assert!(matches!(
        graph.insert(mrna, parent_tag),
        Err(FeatureTreeError::ReservedAttribute { .. })
    ));

    graph
        .schema_mut()
        .define_type("peptide", &[], &[], &[], &["CDS"])
        .unwrap();
    let under_anonymous = NewFeature::new("chr1", "t", "peptide", 1, 5);
    assert!(matches!(
        graph.insert(cds, under_anonymous),
        Err(FeatureTreeError::ParentLacksId { .. })
    ));

    assert_eq!(graph.len(), 4);
}

#[rstest]
fn test_delete_is_lazy(small: (Graph, [NodeId; 4])) {
    let (graph, [gene, mrna, exon, cds]) = small;
    let before = graph.topology_version();
    graph.delete(mrna).unwrap();
    assert_eq!(graph.topology_version(), before + 1);

    assert!(graph.is_live(gene));
    for dead in [mrna, exon, cds] {
        assert!(!graph.is_live(dead));
        assert!(matches!(
            graph.with_record(dead, |r| r.start()),
            Err(FeatureTreeError::DeletedAccess)
        ));
    }
    assert!(graph.children(gene).unwrap().is_empty());
    assert_eq!(graph.by_id("mrna1"), None);
    assert_eq!(graph.by_id("exon1"), None);
    assert!(graph.by_name("tx").is_empty());
    assert!(matches!(graph.delete(exon), Err(FeatureTreeError::DeletedAccess)));

    // IDs held only by dead nodes can be reused
    let mrna2 = graph
        .insert(gene, NewFeature::new("chr1", "t", "mRNA", 1, 5).with_id("mrna1"))
        .unwrap();
    graph
        .insert(mrna2, NewFeature::new("chr1", "t", "exon", 1, 5).with_id("exon1"))
        .unwrap();
    assert_eq!(graph.by_id("mrna1"), Some(mrna2));
    assert_eq!(graph.len(), 3);
}

#[rstest]
fn test_segments(small: (Graph, [NodeId; 4])) {
    let (graph, [_, _, exon, cds]) = small;

    graph
        .update_segments(exon, |record| {
            let mut ranges = record.ranges().clone();
            let mut phases = record.phases().clone();
            ranges.push(Span::new(400, 500));
            phases.push(Phase::Unspecified);
            Ok((ranges, phases))
        })
        .unwrap();
    graph
        .with_record(exon, |r| {
            assert_eq!(r.multiplicity(), 2);
            assert_eq!(r.start(), 100);
            assert_eq!(r.end(), 500);
            assert_eq!(r.length(), 401);
        })
        .unwrap();

    let anonymous = graph.update_segments(cds, |record| {
        Ok((
            vec![record.ranges()[0], Span::new(700, 800)],
            vec![Phase::Zero, Phase::Two],
        ))
    });
    assert!(matches!(anonymous, Err(FeatureTreeError::DiscontinuousLacksId)));

    let unphased =
        graph.update_segments(cds, |_| Ok((vec![Span::new(1, 2)], vec![Phase::Unspecified])));
    assert!(matches!(
        unphased,
        Err(FeatureTreeError::CdsUnspecifiedPhase { .. })
    ));
    graph
        .with_record(cds, |r| assert_eq!(r.phases(), &vec![Phase::Zero]))
        .unwrap();
}

#[rstest]
fn test_attributes_and_names(small: (Graph, [NodeId; 4])) {
    let (graph, [gene, mrna, ..]) = small;
    let before = graph.topology_version();

    graph
        .update_attributes(gene, "Name", |attrs| {
            attrs.insert("Name".into(), vec!["BRCA".into(), "alias".into()]);
        })
        .unwrap();
    assert_eq!(graph.by_name("BRCA"), vec![gene]);
    assert_eq!(graph.by_name("alias"), vec![gene]);

    graph
        .update_attributes(mrna, "Name", |attrs| {
            attrs.shift_remove("Name");
        })
        .unwrap();
    assert!(graph.by_name("tx").is_empty());

    for tag in ["ID", "Parent"] {
        let result = graph.update_attributes(gene, tag, |_| {});
        assert!(matches!(
            result,
            Err(FeatureTreeError::ReservedAttribute { .. })
        ));
    }
    assert_eq!(graph.topology_version(), before);
}

#[rstest]
fn test_set_id(small: (Graph, [NodeId; 4])) {
    let (graph, [gene, mrna, exon, cds]) = small;

    assert!(matches!(
        graph.set_id(exon, Some("mrna1")),
        Err(FeatureTreeError::IdConflict { .. })
    ));
    assert!(matches!(
        graph.set_id(mrna, None),
        Err(FeatureTreeError::IdRequired { .. })
    ));

    graph.set_id(mrna, Some("tx-1")).unwrap();
    assert_eq!(graph.by_id("mrna1"), None);
    assert_eq!(graph.by_id("tx-1"), Some(mrna));
    assert_eq!(graph.parent_ids(cds).unwrap(), vec![FeatureStr::from("tx-1")]);

    graph.set_id(exon, None).unwrap();
    assert_eq!(graph.natural_id(exon).unwrap(), None);
    graph.set_id(gene, Some("gene1")).unwrap();
}

#[test]
fn test_multiple_parentage() {
    let single = Graph::default();
    let g = single.insert(NodeId::ROOT, gene("g")).unwrap();
    assert!(matches!(
        single.add_parent(g, NodeId::ROOT),
        Err(FeatureTreeError::MultipleParentage)
    ));

    let graph = Graph::new(TypeSchema::default(), true);
    let tx1 = graph.insert(NodeId::ROOT, gene("g")).unwrap();
    let m1 = graph
        .insert(tx1, NewFeature::new("c", "s", "mRNA", 1, 50).with_id("m1"))
        .unwrap();
    let m2 = graph
        .insert(tx1, NewFeature::new("c", "s", "mRNA", 1, 80).with_id("m2"))
        .unwrap();
    let shared = graph
        .insert(m1, NewFeature::new("c", "s", "exon", 1, 20).with_id("e"))
        .unwrap();
    graph.add_parent(shared, m2).unwrap();

    assert_eq!(graph.parents(shared).unwrap(), vec![m1, m2]);
    assert_eq!(
        graph.read().preorder(NodeId::ROOT),
        vec![tx1, m1, m2, shared]
    );
    assert!(matches!(
        graph.add_parent(tx1, shared),
        Err(FeatureTreeError::TypeCompatibility { .. })
    ));
    assert!(matches!(
        graph.add_parent(shared, m2),
        Err(FeatureTreeError::InvalidArgument(_))
    ));

    // still reachable through the other parent
    graph.delete(m1).unwrap();
    assert!(graph.is_live(shared));
    assert_eq!(graph.len(), 3);
}

#[rstest]
fn test_reorder_children(small: (Graph, [NodeId; 4])) {
    let (graph, [_, mrna, exon, cds]) = small;
    let seen = graph.topology_version();
    graph.reorder_children(mrna, vec![cds, exon], seen).unwrap();
    assert_eq!(graph.children(mrna).unwrap(), vec![cds, exon]);
    assert!(matches!(
        graph.reorder_children(mrna, vec![exon, cds], seen),
        Err(FeatureTreeError::ConcurrentModification { .. })
    ));
}

#[rstest]
fn test_copy_compacts(small: (Graph, [NodeId; 4])) {
    let (graph, [gene, _, exon, _]) = small;
    graph.delete(exon).unwrap();

    let copy = graph.copy();
    assert_eq!(copy.len(), 3);
    assert_eq!(copy.read().capacity(), 4);
    assert_eq!(copy.topology_version(), 0);
    assert!(copy.by_id("exon1").is_none());
    assert_eq!(copy.by_name("tx").len(), 1);

    // edits stay local to each copy
    copy.delete(copy.by_id("gene1").unwrap()).unwrap();
    assert!(copy.is_empty());
    assert!(graph.is_live(gene));
    assert_eq!(graph.len(), 3);
}

#[test]
fn test_parents_skip_unreachable_links() {
    let graph = Graph::new(TypeSchema::default(), true);
    let g1 = graph.insert(NodeId::ROOT, gene("g1")).unwrap();
    let g2 = graph.insert(NodeId::ROOT, gene("g2")).unwrap();
    let m1 = graph
        .insert(g1, NewFeature::new("c", "s", "mRNA", 1, 50).with_id("m1"))
        .unwrap();
    let m2 = graph
        .insert(g2, NewFeature::new("c", "s", "mRNA", 1, 80).with_id("m2"))
        .unwrap();
    let shared = graph
        .insert(m1, NewFeature::new("c", "s", "exon", 1, 20).with_id("e"))
        .unwrap();
    graph.add_parent(shared, m2).unwrap();

    graph.delete(g1).unwrap();
    assert!(!graph.is_live(m1));
    assert!(graph.is_live(shared));
    assert_eq!(graph.parents(shared).unwrap(), vec![m2]);
    assert_eq!(graph.parent_ids(shared).unwrap(), vec![FeatureStr::from("m2")]);

    // a new holder of the dead parent's ID does not adopt the child
    let g3 = graph.insert(NodeId::ROOT, gene("g3")).unwrap();
    graph
        .insert(g3, NewFeature::new("c", "s", "mRNA", 1, 50).with_id("m1"))
        .unwrap();
    assert_eq!(graph.parent_ids(shared).unwrap(), vec![FeatureStr::from("m2")]);

    let copy = graph.copy();
    let copied = copy.by_id("e").unwrap();
    assert_eq!(copy.parent_ids(copied).unwrap(), vec![FeatureStr::from("m2")]);
}
