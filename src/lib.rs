//! # snp-stack
//!
//! Stacks per-sample VCF files, joins them with gene annotation and run
//! metadata, and produces one denormalized table of variants ready for
//! reporting.
//!
//! ## Pipeline
//!
//! - Parse every variant-call file of a directory and tag its records with
//!   the sample taken from the file name ([`stack`])
//! - Read a GFF-like annotation and keep named genes ([`gff`], [`genes`])
//! - Read the run table and left-join everything by sample and by position
//!   in gene ([`metadata`], [`join`])
//!
//! ## Example
//!
//! ```rust
//! use snp_stack::{
//!     MissingMetadata, RowFilter, SampleNaming, extract_genes, join, parse_gff, parse_metadata,
//!     stack_readers,
//! };
//!
//! let gff = "NC_045512.2\tRefSeq\tgene\t266\t21555\t.\t+\t.\tName=ORF1ab\n";
//! let genes = extract_genes(&parse_gff(gff.as_bytes(), "ref.gff3").unwrap()).unwrap();
//!
//! let vcf = concat!(
//!     "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n",
//!     "MN908947.3\t100\t.\tA\tG\t50\t.\tDP=3\n",
//!     "MN908947.3\t8782\t.\tC\tT\t228\t.\tDP=249\n",
//! );
//! let stacked = stack_readers(vec![("SRR001".to_string(), vcf.as_bytes())]).unwrap();
//!
//! let runs = "Run,organism\nSRR001,H. sapiens\n";
//! let metadata = parse_metadata(runs.as_bytes(), "runs.csv", &SampleNaming::default()).unwrap();
//!
//! let table = join(stacked, &genes, &metadata, MissingMetadata::Fail).unwrap();
//! assert_eq!(table.rows[0].gene, None);
//! assert_eq!(table.rows[1].gene.as_deref(), Some("ORF1ab"));
//!
//! let high = RowFilter::new("round(QUAL) > 100").unwrap().filter_table(table).unwrap();
//! assert_eq!(high.len(), 1);
//! ```
//!
//! ## Filter Expression Syntax
//!
//! ### Comparison Operators
//! - `==` `!=` `>` `<` `>=` `<=`
//! - `contains` String containment
//!
//! ### Logical Operators
//! - `&&` `||` `!`
//!
//! ### Field Access
//! - `QUAL`, `POS`, `FILTER`, ... - VCF columns
//! - `SNP` - single-nucleotide substitution (`true`/`false`)
//! - `sample`, `gene` - join results
//! - `DP` - INFO key, `INFO.DP` to skip other lookups
//! - `organism` - metadata column, `META.organism` to skip other lookups
//! - `ALT[1]` - list element
//!
//! ### Functions
//! - `exists(field)` - Check if a field is present
//! - `round(expr)` - Round half to even

/// Embedded README.md documentation
const README: &str = include_str!("../README.md");

/// Returns the embedded README.md documentation.
pub fn docs() -> &'static str {
    README
}

pub mod attrs;
pub mod config;
pub mod error;
pub mod eval;
pub mod filter;
pub mod genes;
pub mod gff;
pub mod header;
pub mod input;
pub mod join;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod stack;
pub mod summary;
pub mod value;
pub mod vcf;

pub use attrs::KeyValues;
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use eval::Fields;
pub use filter::{AccessPart, BinaryOp, Expr, UnaryOp};
pub use genes::{Gene, GeneTable, extract_genes};
pub use gff::{GenomeFeature, Strand, parse_gff, read_gff};
pub use join::{AnnotatedVariant, AnnotatedVariantTable, MissingMetadata, join};
pub use metadata::{SampleMetadata, SampleMetadataTable, parse_metadata, read_metadata};
pub use pipeline::run;
pub use record::VariantRecord;
pub use stack::{
    SampleNaming, StackedVariant, StackedVariantTable, stack_directory, stack_files,
    stack_readers,
};
pub use value::Value;
pub use vcf::{VcfFile, parse_vcf, read_vcf};

use crate::eval::evaluate;
use crate::filter::parse_filter;

/// A parsed filter expression, ready to be applied to many rows.
#[derive(Debug, Clone)]
pub struct RowFilter {
    expr: Expr,
}

impl RowFilter {
    /// Parse a filter expression.
    ///
    /// ```rust
    /// use snp_stack::RowFilter;
    ///
    /// assert!(RowFilter::new(r#"gene == "S" && QUAL > 30"#).is_ok());
    /// assert!(RowFilter::new("QUAL >").is_err());
    /// ```
    pub fn new(filter: &str) -> Result<Self> {
        let expr = parse_filter(filter).map_err(|errs| {
            Error::FilterParse(
                errs.into_iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        })?;
        Ok(Self { expr })
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate the filter against one row; non-boolean results are false.
    pub fn matches<F: Fields + ?Sized>(&self, row: &F) -> Result<bool> {
        let result = evaluate(&self.expr, row)?;
        Ok(result.as_bool().unwrap_or(false))
    }

    /// Keep the rows of `table` that match, preserving order.
    pub fn filter_table(&self, table: AnnotatedVariantTable) -> Result<AnnotatedVariantTable> {
        let mut rows = Vec::with_capacity(table.rows.len());
        for row in table.rows {
            if self.matches(&row)? {
                rows.push(row);
            }
        }
        Ok(AnnotatedVariantTable {
            metadata_columns: table.metadata_columns,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOTATION: &str = "\
##gff-version 3
NC_045512.2\tRefSeq\tregion\t1\t29903\t.\t+\t.\tID=NC_045512.2:1..29903
NC_045512.2\tRefSeq\tgene\t266\t21555\t.\t+\t.\tID=gene-GU280_gp01;Name=ORF1ab
NC_045512.2\tRefSeq\tgene\t21563\t25384\t.\t+\t.\tID=gene-GU280_gp02;Name=S
";

    const RUNS: &str = "\
Run,Organism,Cell_Line,treatment
SRR001,Homo sapiens,Calu-3,infected
SRR002,Chlorocebus sabaeus,Vero E6,infected
";

    fn vcf(rows: &[(u64, &str)]) -> String {
        let mut text = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n".to_string();
        for (pos, qual) in rows {
            text.push_str(&format!("MN908947.3\t{}\t.\tC\tT\t{}\t.\tDP=40\n", pos, qual));
        }
        text
    }

    fn table() -> AnnotatedVariantTable {
        let genes = extract_genes(&parse_gff(ANNOTATION.as_bytes(), "ref.gff3").unwrap()).unwrap();
        let a = vcf(&[(241, "50"), (8782, "100"), (23403, "100.4")]);
        let b = vcf(&[(23403, "250"), (28881, ".")]);
        let stacked = stack_readers(vec![
            ("SRR001".to_string(), a.as_bytes()),
            ("SRR002".to_string(), b.as_bytes()),
        ])
        .unwrap();
        let metadata =
            parse_metadata(RUNS.as_bytes(), "runs.csv", &SampleNaming::default()).unwrap();
        join(stacked, &genes, &metadata, MissingMetadata::Fail).unwrap()
    }

    #[test]
    fn test_rounded_quality_filter() {
        let high = RowFilter::new("round(QUAL) > 100")
            .unwrap()
            .filter_table(table())
            .unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high.rows[0].record.qual, Some(250.0));
        assert_eq!(high.metadata_columns.len(), 4);
    }

    #[test]
    fn test_filter_on_gene_and_metadata() {
        let filter = RowFilter::new(r#"gene == "S" && cell_line contains "Vero""#).unwrap();
        let kept = filter.filter_table(table()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.rows[0].sample, "SRR002");
    }

    #[test]
    fn test_filter_outside_genes() {
        let filter = RowFilter::new("!exists(gene)").unwrap();
        let kept = filter.filter_table(table()).unwrap();
        let positions: Vec<u64> = kept.iter().map(|r| r.record.pos).collect();
        assert_eq!(positions, vec![241, 28881]);
    }

    #[test]
    fn test_not_equal_skips_rows_without_gene() {
        let kept = RowFilter::new(r#"gene != "S""#)
            .unwrap()
            .filter_table(table())
            .unwrap();
        let positions: Vec<u64> = kept.iter().map(|r| r.record.pos).collect();
        assert_eq!(positions, vec![8782]);

        let both_missing = RowFilter::new("gene == ID")
            .unwrap()
            .filter_table(table())
            .unwrap();
        assert!(both_missing.is_empty());
    }

    #[test]
    fn test_filter_parse_error() {
        let err = RowFilter::new("gene ==").unwrap_err();
        assert!(matches!(err, Error::FilterParse(_)));
    }

    #[test]
    fn test_filter_on_plain_record() {
        let vcf = parse_vcf(vcf(&[(1, "12")]).as_bytes(), "a.vcf").unwrap();
        let filter = RowFilter::new("QUAL < 20 && DP == 40").unwrap();
        assert!(filter.matches(&vcf.records[0]).unwrap());
    }

    #[test]
    fn test_docs_are_embedded() {
        assert!(docs().contains("snp-stack"));
    }
}
