//! Projection of annotation features onto named gene intervals.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::gff::GenomeFeature;

/// Attribute keys holding a gene's display name, in lookup order.
pub const NAME_KEYS: &[&str] = &["Name", "gene_name", "gene"];

/// A named gene interval, 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gene {
    #[serde(rename = "gene")]
    pub name: String,
    pub start: u64,
    pub end: u64,
}

impl Gene {
    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Gene intervals ordered by start position.
///
/// Genes with equal start keep their annotation order, which makes
/// [`GeneTable::lookup`] deterministic for overlapping intervals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneTable {
    genes: Vec<Gene>,
}

impl GeneTable {
    pub fn new(mut genes: Vec<Gene>) -> Self {
        genes.sort_by_key(|g| g.start);
        Self { genes }
    }

    /// The first gene in start order whose interval contains `pos`.
    pub fn lookup(&self, pos: u64) -> Option<&Gene> {
        self.genes
            .iter()
            .take_while(|g| g.start <= pos)
            .find(|g| g.contains(pos))
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// Keep `gene` features and project them to `(name, start, end)`.
pub fn extract_genes(features: &[GenomeFeature]) -> Result<GeneTable> {
    let genes = features
        .iter()
        .filter(|f| f.feature_type == "gene")
        .map(|f| {
            let name = f.attributes.first_of(NAME_KEYS).ok_or_else(|| {
                Error::Extraction(format!(
                    "gene feature at {}:{}-{} has none of the attributes {}",
                    f.seqid,
                    f.start,
                    f.end,
                    NAME_KEYS.join(", ")
                ))
            })?;
            Ok(Gene {
                name: name.to_string(),
                start: f.start,
                end: f.end,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        "extracted {} genes from {} features",
        genes.len(),
        features.len()
    );
    Ok(GeneTable::new(genes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gff::parse_gff;
    use pretty_assertions::assert_eq;

    fn gene(name: &str, start: u64, end: u64) -> Gene {
        Gene {
            name: name.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_extract_only_genes() {
        let text = "\
NC_045512.2\tRefSeq\tregion\t1\t29903\t.\t+\t.\tID=NC_045512.2:1..29903
NC_045512.2\tRefSeq\tgene\t21563\t25384\t.\t+\t.\tID=gene-GU280_gp02;gene_name=S
NC_045512.2\tRefSeq\tCDS\t21563\t25384\t.\t+\t0\tID=cds-YP_009724390.1;Name=YP_009724390.1
NC_045512.2\tRefSeq\tgene\t266\t21555\t.\t+\t.\tID=gene-GU280_gp01;Name=ORF1ab
NC_045512.2\tRefSeq\tgene\t28274\t29533\t.\t+\t.\tID=gene-GU280_gp10;gene=N
";
        let features = parse_gff(text.as_bytes(), "ref.gff3").unwrap();
        let table = extract_genes(&features).unwrap();

        assert!(table.len() <= features.len());
        assert_eq!(
            table.genes(),
            &[
                gene("ORF1ab", 266, 21555),
                gene("S", 21563, 25384),
                gene("N", 28274, 29533)
            ]
        );
    }

    #[test]
    fn test_unnamed_gene_is_an_error() {
        let text = "NC_045512.2\tRefSeq\tgene\t266\t21555\t.\t+\t.\tID=gene-GU280_gp01\n";
        let features = parse_gff(text.as_bytes(), "ref.gff3").unwrap();
        let err = extract_genes(&features).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert!(err.to_string().contains("NC_045512.2:266-21555"));
    }

    #[test]
    fn test_lookup_containment() {
        let table = GeneTable::new(vec![gene("ORF1ab", 266, 21555)]);
        assert_eq!(table.lookup(8782).map(|g| g.name.as_str()), Some("ORF1ab"));
        assert_eq!(table.lookup(100), None);
        assert_eq!(table.lookup(266).map(|g| g.name.as_str()), Some("ORF1ab"));
        assert_eq!(table.lookup(21555).map(|g| g.name.as_str()), Some("ORF1ab"));
        assert_eq!(table.lookup(21556), None);
    }

    #[test]
    fn test_lookup_overlap_takes_first_by_start() {
        // ORF7b starts inside ORF7a; the earlier start wins.
        let table = GeneTable::new(vec![gene("ORF7b", 27756, 27887), gene("ORF7a", 27394, 27759)]);
        assert_eq!(table.lookup(27757).map(|g| g.name.as_str()), Some("ORF7a"));
        assert_eq!(table.lookup(27800).map(|g| g.name.as_str()), Some("ORF7b"));
    }

    #[test]
    fn test_lookup_equal_start_keeps_annotation_order() {
        let table = GeneTable::new(vec![gene("A", 10, 50), gene("B", 10, 20)]);
        assert_eq!(table.lookup(15).map(|g| g.name.as_str()), Some("A"));
    }
}
