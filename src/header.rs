//! VCF header parser.
//!
//! The header is the block of `##` meta lines followed by the single
//! `#CHROM ...` column line. Meta lines are kept verbatim so that a file can
//! be written back unchanged.

use crate::error::{Error, Result};

/// The eight columns every variant-call file starts with.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO",
];

/// Parsed header of one variant-call file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VcfHeader {
    /// The `##` meta lines, without line terminators.
    pub meta: Vec<String>,
    /// Column names from the header line, leading `#` stripped.
    pub columns: Vec<String>,
}

impl VcfHeader {
    /// Number of tab-separated fields each data row must have at least.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Names of the per-sample genotype columns (after FORMAT).
    pub fn sample_names(&self) -> &[String] {
        if self.columns.len() > 9 {
            &self.columns[9..]
        } else {
            &[]
        }
    }

    /// The header line as written in a file.
    pub fn column_line(&self) -> String {
        format!("#{}", self.columns.join("\t"))
    }
}

/// Parse the `#CHROM` column line.
///
/// `source` and `line_no` are only used for error messages.
pub fn parse_column_line(line: &str, source: &str, line_no: usize) -> Result<Vec<String>> {
    let line = line.strip_prefix('#').unwrap_or(line);
    let columns: Vec<String> = line
        .trim_end_matches(['\r', '\n'])
        .split('\t')
        .map(|s| s.trim().to_string())
        .collect();

    if columns.len() < REQUIRED_COLUMNS.len() {
        return Err(Error::parse(
            source,
            line_no,
            format!(
                "header declares {} columns, expected at least {}",
                columns.len(),
                REQUIRED_COLUMNS.len()
            ),
        ));
    }

    for (i, expected) in REQUIRED_COLUMNS.iter().enumerate() {
        if !columns[i].eq_ignore_ascii_case(expected) {
            return Err(Error::parse(
                source,
                line_no,
                format!(
                    "header column {} is {:?}, expected {:?}",
                    i + 1,
                    columns[i],
                    expected
                ),
            ));
        }
    }

    if columns.len() > REQUIRED_COLUMNS.len() && !columns[8].eq_ignore_ascii_case("FORMAT") {
        return Err(Error::parse(
            source,
            line_no,
            format!("header column 9 is {:?}, expected \"FORMAT\"", columns[8]),
        ));
    }

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_line_with_sample() {
        let columns = parse_column_line(
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tresults/bam/SRR11454606.aligned.sorted.bam",
            "a.vcf",
            3,
        )
        .unwrap();
        let header = VcfHeader {
            meta: vec![],
            columns,
        };
        assert_eq!(header.width(), 10);
        assert_eq!(
            header.sample_names(),
            ["results/bam/SRR11454606.aligned.sorted.bam".to_string()]
        );
    }

    #[test]
    fn test_sites_only_header() {
        let columns =
            parse_column_line("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO", "a.vcf", 1).unwrap();
        assert_eq!(columns.len(), 8);
        let header = VcfHeader {
            meta: vec![],
            columns,
        };
        assert!(header.sample_names().is_empty());
        assert_eq!(
            header.column_line(),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO"
        );
    }

    #[test]
    fn test_short_header_is_rejected() {
        let err = parse_column_line("#CHROM\tPOS\tID", "a.vcf", 7).unwrap_err();
        assert!(err.to_string().starts_with("a.vcf:7:"));
    }

    #[test]
    fn test_wrong_column_name_is_rejected() {
        let err = parse_column_line("#CHROM\tPOS\tID\tREF\tALT\tSCORE\tFILTER\tINFO", "a.vcf", 1)
            .unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
        assert!(err.to_string().contains("SCORE"));
    }
}
