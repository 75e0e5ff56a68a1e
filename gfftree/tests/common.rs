#![allow(dead_code)]
use std::path::PathBuf;

use gfftree::prelude::*;

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Row with the given columns and raw column 9.
pub fn row(
    seqid: &str,
    feature_type: &str,
    start: PosType,
    end: PosType,
    phase: &str,
    attributes: &str,
) -> String {
    format!("{seqid}\ttest\t{feature_type}\t{start}\t{end}\t.\t+\t{phase}\t{attributes}\n")
}

pub struct SyntheticGenome {
    pub n_genes:       usize,
    pub n_transcripts: usize,
    pub n_exons:       usize,
}

impl SyntheticGenome {
    pub const EXON_LENGTH: PosType = 500;

    /// Features the built store holds: every gene, transcript, exon and the
    /// one CDS per transcript.
    pub fn n_features(&self) -> usize {
        self.n_genes * (1 + self.n_transcripts * (2 + self.n_exons))
    }

    pub fn build(&self) -> anyhow::Result<MutableGenome> {
        let genome = MutableGenome::blank();
        for g in 0..self.n_genes {
            let seqid = format!("chr{}", g % 3 + 1);
            let start = g as PosType * 100_000 + 1;
            let gene = genome.insert(
                NewFeature::new(&seqid, "synthetic", "gene", start, start + 90_000)
                    .with_strand(if g % 2 == 0 { Strand::Plus } else { Strand::Minus })
                    .with_id(format!("g{g}"))
                    .with_attribute("Name", [format!("GENE{g}")]),
            )?;
            for t in 0..self.n_transcripts {
                let transcript = gene.insert(
                    NewFeature::new(&seqid, "synthetic", "mRNA", start, start + 90_000)
                        .with_id(format!("g{g}.t{t}")),
                )?;
                for e in 0..self.n_exons {
                    let exon_start = start + (e as PosType) * 5_000;
                    transcript.insert(NewFeature::new(
                        &seqid,
                        "synthetic",
                        "exon",
                        exon_start,
                        exon_start + Self::EXON_LENGTH - 1,
                    ))?;
                }
                transcript.insert(
                    NewFeature::new(&seqid, "synthetic", "CDS", start + 100, start + 400)
                        .with_phase(Phase::Zero),
                )?;
            }
        }
        Ok(genome)
    }
}
