//! GFF-like annotation reader.
//!
//! Reads every feature of a 9-column annotation file. No filtering happens
//! here; see [`crate::genes`] for the gene-only projection.

use std::io::BufRead;
use std::path::Path;

use crate::attrs::KeyValues;
use crate::error::{Error, Result};
use crate::input::open_input;

/// Strand of a feature (column 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
    /// `.`, not stranded.
    Unstranded,
    /// `?`, stranded but unknown.
    Unknown,
}

impl Strand {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            "." => Some(Strand::Unstranded),
            "?" => Some(Strand::Unknown),
            _ => None,
        }
    }
}

/// One annotated feature of the reference genome.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeFeature {
    pub seqid: String,
    pub source: String,
    /// e.g. "gene", "CDS", "five_prime_UTR".
    pub feature_type: String,
    /// 1-based, inclusive.
    pub start: u64,
    /// 1-based, inclusive, `>= start`.
    pub end: u64,
    pub score: Option<f64>,
    pub strand: Strand,
    pub phase: Option<u8>,
    pub attributes: KeyValues,
}

impl GenomeFeature {
    /// Whether the closed interval `[start, end]` contains `pos`.
    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos <= self.end
    }
}

fn parse_coord(raw: &str, name: &str, source: &str, line_no: usize) -> Result<u64> {
    raw.parse::<u64>()
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| {
            Error::parse(
                source,
                line_no,
                format!("invalid {} {:?}, expected a positive integer", name, raw),
            )
        })
}

/// Parse one feature line.
fn parse_feature(line: &str, source: &str, line_no: usize) -> Result<GenomeFeature> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 {
        return Err(Error::parse(
            source,
            line_no,
            format!("expected 9 tab-separated columns, got {}", fields.len()),
        ));
    }

    let start = parse_coord(fields[3], "start", source, line_no)?;
    let end = parse_coord(fields[4], "end", source, line_no)?;
    if start > end {
        return Err(Error::parse(
            source,
            line_no,
            format!("start {} is after end {}", start, end),
        ));
    }

    let strand = Strand::parse(fields[6]).ok_or_else(|| {
        Error::parse(source, line_no, format!("invalid strand {:?}", fields[6]))
    })?;

    Ok(GenomeFeature {
        seqid: fields[0].to_string(),
        source: fields[1].to_string(),
        feature_type: fields[2].to_string(),
        start,
        end,
        score: fields[5].parse().ok(),
        strand,
        phase: fields[7].parse().ok(),
        attributes: KeyValues::parse(fields[8]),
    })
}

/// Parse annotation features from a reader.
///
/// Comment and directive lines (`#...`) are skipped and a `##FASTA`
/// directive ends the feature section.
pub fn parse_gff<R: BufRead>(reader: R, source: &str) -> Result<Vec<GenomeFeature>> {
    let mut features = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line
            .map_err(|e| Error::parse(source, line_no, format!("unreadable line: {}", e)))?;
        let line = line.trim_end_matches('\r');

        if line.starts_with("##FASTA") {
            break;
        }
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        features.push(parse_feature(line, source, line_no)?);
    }

    Ok(features)
}

/// Read and parse an annotation file, plain or gzip-compressed.
pub fn read_gff<P: AsRef<Path>>(path: P) -> Result<Vec<GenomeFeature>> {
    let path = path.as_ref();
    let features = parse_gff(open_input(path)?, &path.display().to_string())?;
    tracing::info!("read {} annotation features from {:?}", features.len(), path);
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOTATION: &str = "##gff-version 3
#!gff-spec-version 1.21
##sequence-region NC_045512.2 1 29903
NC_045512.2\tRefSeq\tregion\t1\t29903\t.\t+\t.\tID=NC_045512.2:1..29903;Dbxref=taxon:2697049
NC_045512.2\tRefSeq\tfive_prime_UTR\t1\t265\t.\t+\t.\tID=id-NC_045512.2:1..265;gbkey=5'UTR
NC_045512.2\tRefSeq\tgene\t266\t21555\t.\t+\t.\tID=gene-GU280_gp01;Name=ORF1ab;gbkey=Gene;gene=ORF1ab
NC_045512.2\tRefSeq\tCDS\t266\t13468\t.\t+\t0\tID=cds-YP_009724389.1;Parent=gene-GU280_gp01;gene=ORF1ab
NC_045512.2\tRefSeq\tgene\t21563\t25384\t.\t+\t.\tID=gene-GU280_gp02;Name=S;gbkey=Gene;gene=S
##FASTA
>NC_045512.2
ATTAAAGGTTTATACCTTCC
";

    #[test]
    fn test_parse_all_features() {
        let features = parse_gff(ANNOTATION.as_bytes(), "ref.gff3").unwrap();
        assert_eq!(features.len(), 5);

        let orf1ab = &features[2];
        assert_eq!(orf1ab.feature_type, "gene");
        assert_eq!((orf1ab.start, orf1ab.end), (266, 21555));
        assert_eq!(orf1ab.strand, Strand::Forward);
        assert_eq!(orf1ab.attributes.get("Name"), Some("ORF1ab"));
        assert_eq!(orf1ab.score, None);
        assert_eq!(features[3].phase, Some(0));
        assert!(orf1ab.contains(266));
        assert!(orf1ab.contains(21555));
        assert!(!orf1ab.contains(21556));
    }

    #[test]
    fn test_wrong_column_count() {
        let text = "chr\tsrc\tgene\t1\t10\t.\t+\tID=x\n";
        let err = parse_gff(text.as_bytes(), "bad.gff").unwrap_err();
        assert!(err.to_string().starts_with("bad.gff:1:"), "{}", err);
        assert!(err.to_string().contains("got 8"));
    }

    #[test]
    fn test_start_after_end() {
        let text = "##gff-version 3\nchr\tsrc\tgene\t20\t10\t.\t+\t.\tName=x\n";
        let err = parse_gff(text.as_bytes(), "bad.gff").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_read_missing_file_names_it() {
        let err = read_gff("/nonexistent/ref.gff3").unwrap_err();
        assert!(matches!(err, Error::PipelineInput { .. }));
        assert!(err.to_string().contains("/nonexistent/ref.gff3"), "{}", err);
    }

    #[test]
    fn test_non_numeric_coordinate() {
        let text = "chr\tsrc\tgene\tone\t10\t.\t-\t.\tName=x\n";
        assert!(parse_gff(text.as_bytes(), "bad.gff").is_err());
    }
}
