//! Per-value row counts, e.g. SNPs per organism or per gene.

use indexmap::IndexMap;

use crate::eval::Fields;

/// Key used for rows where the field is missing.
pub const MISSING_KEY: &str = "NA";

/// Count rows per rendered value of `field`.
///
/// The result is ordered by descending count, ties by key.
pub fn count_by<'a, F, I>(rows: I, field: &str) -> IndexMap<String, usize>
where
    F: Fields + 'a,
    I: IntoIterator<Item = &'a F>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for row in rows {
        let key = row
            .field(field)
            .render()
            .unwrap_or_else(|| MISSING_KEY.to_string());
        *counts.entry(key).or_default() += 1;
    }
    counts.sort_by(|ka, va, kb, vb| vb.cmp(va).then_with(|| ka.cmp(kb)));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{VariantRecord, parse_record};

    fn records(rows: &[&str]) -> Vec<VariantRecord> {
        rows.iter()
            .enumerate()
            .map(|(i, r)| parse_record(r, 8, "t.vcf", i + 1).unwrap())
            .collect()
    }

    #[test]
    fn test_count_by_alt() {
        let recs = records(&[
            "c\t1\t.\tC\tT\t1\t.\t.",
            "c\t2\t.\tG\tT\t1\t.\t.",
            "c\t3\t.\tA\tG\t1\t.\t.",
            "c\t4\t.\tA\t.\t1\t.\t.",
        ]);
        let counts = count_by(&recs, "ALT");
        let pairs: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(pairs, vec![("T", 2), ("G", 1), ("NA", 1)]);
    }

    #[test]
    fn test_counts_sum_to_rows() {
        let recs = records(&["c\t1\t.\tC\tT\t1\t.\tDP=3", "c\t2\t.\tG\tT\t1\t.\tDP=4"]);
        let counts = count_by(&recs, "DP");
        assert_eq!(counts.values().sum::<usize>(), recs.len());
    }
}
