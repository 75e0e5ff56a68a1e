//! Built-in slice of the Sequence Ontology.
//!
//! Each entry is `(canonical name, exact synonyms, rough synonyms, part of)`.
//! Entries only reference types defined above them.

pub(super) type SeedEntry = (
    &'static str,
    &'static [&'static str],
    &'static [&'static str],
    &'static [&'static str],
);

pub(super) const SEED_TYPES: &[SeedEntry] = &[
    ("chromosome", &["SO:0000340"], &[], &[]),
    ("scaffold", &["SO:0000148"], &["supercontig"], &[]),
    ("contig", &["SO:0000149"], &[], &[]),
    ("gene", &["SO:0000704"], &[], &[]),
    (
        "mRNA",
        &[
            "SO:0000234",
            "messenger RNA",
            "messenger_RNA",
            "INSDC_feature:mRNA",
            "protein_coding_transcript",
        ],
        &[],
        &["gene"],
    ),
    ("transcript", &["SO:0000673"], &[], &["gene"]),
    (
        "exon",
        &["SO:0000147", "INSDC_feature:exon"],
        &[],
        &["mRNA", "transcript"],
    ),
    (
        "intron",
        &["SO:0000188", "INSDC_feature:intron"],
        &[],
        &["mRNA", "transcript"],
    ),
    (
        "CDS",
        &[
            "SO:0000316",
            "coding_sequence",
            "coding sequence",
            "INSDC_feature:CDS",
        ],
        &[],
        &["mRNA"],
    ),
    (
        "five_prime_UTR",
        &[
            "SO:0000204",
            "five_prime_untranslated_region",
            "five prime UTR",
            "5' UTR",
            "INSDC_feature:5'UTR",
        ],
        &[],
        &["mRNA"],
    ),
    (
        "three_prime_UTR",
        &[
            "SO:0000205",
            "three_prime_untranslated_region",
            "three prime UTR",
            "3' UTR",
            "INSDC_feature:3'UTR",
        ],
        &[],
        &["mRNA"],
    ),
    ("start_codon", &["SO:0000318"], &["initiation codon"], &["mRNA"]),
    ("stop_codon", &["SO:0000319"], &["termination codon"], &["mRNA"]),
];

/// Canonical name of the type whose ranges must all carry a phase.
pub const CDS_TYPE: &str = "CDS";
