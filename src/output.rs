//! Delimited-text output of the annotated table and the gene table.

use std::io::Write;

use indexmap::IndexMap;

use crate::error::Result;
use crate::genes::GeneTable;
use crate::join::AnnotatedVariantTable;

/// Columns written before the metadata columns.
pub const VARIANT_COLUMNS: &[&str] = &[
    "sample", "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT", "GENOTYPES",
    "gene",
];

/// Prefix for metadata columns whose name is already a variant column.
pub const METADATA_PREFIX: &str = "meta_";

/// Header name of a metadata column in the written table.
fn metadata_header(column: &str) -> String {
    if VARIANT_COLUMNS.contains(&column) {
        format!("{}{}", METADATA_PREFIX, column)
    } else {
        column.to_string()
    }
}

/// Write the annotated table with a header row.
///
/// Missing values are empty cells. Several genotype columns are joined with
/// a space, which VCF sample fields cannot contain. A metadata column named
/// like a variant column (e.g. a `sample` run identifier) is written as
/// `meta_<name>`.
pub fn write_table<W: Write>(
    table: &AnnotatedVariantTable,
    writer: W,
    delimiter: u8,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let mut header: Vec<String> = VARIANT_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(table.metadata_columns.iter().map(|c| metadata_header(c)));
    writer.write_record(&header)?;

    for row in table.iter() {
        let rec = &row.record;
        let mut cells: Vec<String> = vec![
            row.sample.clone(),
            rec.chrom.clone(),
            rec.pos.to_string(),
            rec.id.clone().unwrap_or_default(),
            rec.ref_allele.clone(),
            rec.alt_alleles.join(","),
            rec.qual.map(|q| q.to_string()).unwrap_or_default(),
            rec.filter.join(";"),
            if rec.info.is_empty() {
                String::new()
            } else {
                rec.info.to_string()
            },
            rec.format.clone().unwrap_or_default(),
            rec.genotypes.join(" "),
            row.gene.clone().unwrap_or_default(),
        ];
        cells.extend(table.metadata_columns.iter().map(|c| {
            row.metadata
                .as_ref()
                .and_then(|m| m.fields.get(c))
                .cloned()
                .unwrap_or_default()
        }));
        writer.write_record(&cells)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the gene table as `gene, start, end` rows.
pub fn write_genes<W: Write>(genes: &GeneTable, writer: W, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    for gene in genes.genes() {
        writer.serialize(gene)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `field, count` rows as produced by [`crate::summary::count_by`].
pub fn write_counts<W: Write>(
    field: &str,
    counts: &IndexMap<String, usize>,
    writer: W,
    delimiter: u8,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    writer.write_record([field, "count"])?;
    for (key, count) in counts {
        writer.write_record([key.as_str(), count.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genes::Gene;
    use crate::join::{MissingMetadata, join};
    use crate::metadata::parse_metadata;
    use crate::stack::{SampleNaming, stack_readers};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_table() {
        let vcf = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tbam\n\
                   MN908947.3\t8782\t.\tC\tT\t228\t.\tDP=249\tGT\t1\n\
                   MN908947.3\t100\t.\tA\tG\t.\t.\t.\tGT\t1\n";
        let stacked = stack_readers(vec![
            ("SRR001".to_string(), vcf.as_bytes()),
            ("SRR999".to_string(), vcf.as_bytes()),
        ])
        .unwrap();
        let genes = GeneTable::new(vec![Gene {
            name: "ORF1ab".to_string(),
            start: 266,
            end: 21555,
        }]);
        let meta = parse_metadata(
            "Run,organism\nSRR001,H. sapiens\n".as_bytes(),
            "runs.csv",
            &SampleNaming::default(),
        )
        .unwrap();
        let table = join(stacked, &genes, &meta, MissingMetadata::NullFill).unwrap();

        let mut buf = Vec::new();
        write_table(&table, &mut buf, b'\t').unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "sample\tCHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tGENOTYPES\tgene\tRun\torganism"
        );
        assert_eq!(
            lines[1],
            "SRR001\tMN908947.3\t8782\t\tC\tT\t228\t\tDP=249\tGT\t1\tORF1ab\tSRR001\tH. sapiens"
        );
        assert_eq!(lines[2], "SRR001\tMN908947.3\t100\t\tA\tG\t\t\t\tGT\t1\t\tSRR001\tH. sapiens");
        assert_eq!(lines[3], "SRR999\tMN908947.3\t8782\t\tC\tT\t228\t\tDP=249\tGT\t1\tORF1ab\t\t");
    }

    #[test]
    fn test_sample_id_column_does_not_clash() {
        let vcf = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                   MN908947.3\t8782\t.\tC\tT\t228\t.\t.\n";
        let stacked = stack_readers(vec![("SRR001".to_string(), vcf.as_bytes())]).unwrap();
        let meta = parse_metadata(
            "sample,organism\nSRR001_variants,H. sapiens\n".as_bytes(),
            "runs.csv",
            &SampleNaming::default(),
        )
        .unwrap();
        let table = join(stacked, &GeneTable::default(), &meta, MissingMetadata::Fail).unwrap();

        let mut buf = Vec::new();
        write_table(&table, &mut buf, b',').unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "sample,CHROM,POS,ID,REF,ALT,QUAL,FILTER,INFO,FORMAT,GENOTYPES,gene,meta_sample,organism"
        );
        assert_eq!(lines[1], "SRR001,MN908947.3,8782,,C,T,228,,,,,,SRR001_variants,H. sapiens");
    }

    #[test]
    fn test_write_counts_quotes_delimiters() {
        let mut counts = IndexMap::new();
        counts.insert("G,T".to_string(), 2);
        counts.insert("Homo sapiens, lung".to_string(), 1);
        counts.insert("NA".to_string(), 1);

        let mut buf = Vec::new();
        write_counts("ALT", &counts, &mut buf, b',').unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "ALT,count\n\"G,T\",2\n\"Homo sapiens, lung\",1\nNA,1\n"
        );

        let mut buf = Vec::new();
        write_counts("ALT", &counts, &mut buf, b'\t').unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "ALT\tcount\nG,T\t2\nHomo sapiens, lung\t1\nNA\t1\n"
        );
    }

    #[test]
    fn test_write_genes() {
        let genes = GeneTable::new(vec![
            Gene {
                name: "S".to_string(),
                start: 21563,
                end: 25384,
            },
            Gene {
                name: "ORF1ab".to_string(),
                start: 266,
                end: 21555,
            },
        ]);
        let mut buf = Vec::new();
        write_genes(&genes, &mut buf, b',').unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "gene,start,end\nORF1ab,266,21555\nS,21563,25384\n"
        );
    }
}
