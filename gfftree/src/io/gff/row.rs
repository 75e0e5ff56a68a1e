use std::fmt::Write as _;
use std::io::Write;

use itertools::Itertools;
use log::debug;

use super::encoding::percent_encode;
use crate::data_structs::graph::{
    Arena,
    Graph,
    NodeId,
};
use crate::data_structs::record::{
    ID_TAG,
    PARENT_TAG,
};
use crate::error::Result;

pub const GFF_HEADER: &str = "##gff-version 3";

fn push_attribute<'a>(
    column: &mut Vec<String>,
    tag: &str,
    values: impl IntoIterator<Item = &'a str>,
) {
    let values = values
        .into_iter()
        .map(|value| percent_encode(value, true))
        .join(",");
    if !values.is_empty() {
        column.push(format!("{}={}", percent_encode(tag, true), values));
    }
}

/// Appends the GFF3 rows of `node` to `out`, one per range, each ending
/// with a newline. Column 9 lists `ID`, then `Parent`, then the stored
/// attributes in insertion order.
pub(crate) fn write_node(
    arena: &Arena,
    node: NodeId,
    out: &mut String,
) -> Result<()> {
    let record = arena.record(node)?;
    let stored = arena.node(node);

    let mut column: Vec<String> = Vec::new();
    push_attribute(&mut column, ID_TAG, stored.id.as_deref());
    push_attribute(
        &mut column,
        PARENT_TAG,
        arena
            .live_parents(node)
            .filter_map(|parent| arena.node(parent).id.as_deref()),
    );
    for (tag, values) in record.attributes() {
        push_attribute(&mut column, tag, values.iter().map(String::as_str));
    }
    let attributes = match column.is_empty() {
        true => ".".to_string(),
        false => column.join(";"),
    };
    let score = record
        .score()
        .map(|score| score.to_string())
        .unwrap_or_else(|| ".".to_string());

    for (range, phase) in record.segments() {
        // Infallible: fmt::Write for String never errors.
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            percent_encode(record.seqid(), false),
            percent_encode(record.source(), false),
            percent_encode(record.feature_type(), false),
            range.start,
            range.end,
            score,
            record.strand(),
            phase,
            attributes
        );
    }
    Ok(())
}

/// GFF3 rows of every live feature under `node` in pre-order, preceded by
/// the rows of `node` itself unless it is the store root.
pub(crate) fn write_subtree(
    graph: &Graph,
    node: NodeId,
) -> Result<String> {
    let arena = graph.read();
    arena.check_live(node)?;
    let mut rows = String::new();
    if !node.is_root() {
        write_node(&arena, node, &mut rows)?;
    }
    for below in arena.preorder(node) {
        write_node(&arena, below, &mut rows)?;
    }
    Ok(rows)
}

/// Writes the version header followed by every live feature in pre-order.
/// A feature with several parents follows the last of them.
pub(crate) fn write_graph<W: Write>(
    graph: &Graph,
    mut writer: W,
) -> Result<()> {
    let arena = graph.read();
    let order = arena.preorder(NodeId::ROOT);
    writeln!(writer, "{GFF_HEADER}")?;
    let mut rows = String::new();
    for node in order.iter() {
        rows.clear();
        write_node(&arena, *node, &mut rows)?;
        writer.write_all(rows.as_bytes())?;
    }
    writer.flush()?;
    debug!("Wrote {} features as GFF3", order.len());
    Ok(())
}
