//! Join of stacked variants with gene intervals and run metadata.
//!
//! The join is a left join on the variant side: the output has exactly one
//! row per stacked variant, in stacking order.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::eval::Fields;
use crate::genes::GeneTable;
use crate::metadata::{SampleMetadata, SampleMetadataTable};
use crate::record::VariantRecord;
use crate::stack::StackedVariantTable;
use crate::value::Value;

/// What to do with a sample that has no metadata row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingMetadata {
    /// Abort the join with [`Error::Join`] naming the sample.
    #[default]
    Fail,
    /// Keep the sample's rows with empty metadata and log a warning.
    NullFill,
}

/// One row of the final analysis table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedVariant {
    pub sample: String,
    pub record: VariantRecord,
    /// First gene (in start order) containing the position, if any.
    pub gene: Option<String>,
    /// `None` only under [`MissingMetadata::NullFill`].
    pub metadata: Option<Arc<SampleMetadata>>,
}

impl AnnotatedVariant {
    fn metadata_field(&self, name: &str) -> Value {
        self.metadata
            .as_ref()
            .and_then(|m| m.field(name))
            .into()
    }
}

impl Fields for AnnotatedVariant {
    /// `sample` and `gene` first, then VCF columns and INFO keys, then
    /// metadata columns.
    fn field(&self, name: &str) -> Value {
        match name {
            "sample" => Value::String(self.sample.clone()),
            "gene" => self.gene.clone().into(),
            _ => match self.record.get(name) {
                Value::Missing => self.metadata_field(name),
                value => value,
            },
        }
    }

    fn namespaced(&self, namespace: &str, name: &str) -> Value {
        match namespace {
            "INFO" => self.record.info_field(name),
            "META" => self.metadata_field(name),
            _ => Value::Missing,
        }
    }
}

/// The denormalized result of the pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotatedVariantTable {
    /// Metadata columns in run-table order.
    pub metadata_columns: Vec<String>,
    pub rows: Vec<AnnotatedVariant>,
}

impl AnnotatedVariantTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedVariant> {
        self.rows.iter()
    }
}

/// Join stacked variants with genes (by position) and metadata (by sample).
///
/// Every sample of `stacked` must have a metadata row unless `policy` is
/// [`MissingMetadata::NullFill`]. Chromosome names are not compared, the
/// gene table is assumed to describe the single reference contig.
pub fn join(
    stacked: StackedVariantTable,
    genes: &GeneTable,
    metadata: &SampleMetadataTable,
    policy: MissingMetadata,
) -> Result<AnnotatedVariantTable> {
    for sample in &stacked.samples {
        if metadata.get(sample).is_some() {
            continue;
        }
        match policy {
            MissingMetadata::Fail => {
                return Err(Error::Join(format!(
                    "sample {:?} has no row in the metadata table (matched on column {:?})",
                    sample, metadata.id_column
                )));
            }
            MissingMetadata::NullFill => {
                tracing::warn!(
                    "sample {} has no metadata, keeping its rows with empty metadata",
                    sample
                );
            }
        }
    }

    let mut unmatched_genes = 0;
    let rows: Vec<AnnotatedVariant> = stacked
        .rows
        .into_iter()
        .map(|row| {
            let gene = genes.lookup(row.record.pos).map(|g| g.name.clone());
            if gene.is_none() {
                unmatched_genes += 1;
            }
            AnnotatedVariant {
                metadata: metadata.get(&row.sample).cloned(),
                sample: row.sample,
                record: row.record,
                gene,
            }
        })
        .collect();

    tracing::info!(
        "joined {} variants ({} outside any gene)",
        rows.len(),
        unmatched_genes
    );
    Ok(AnnotatedVariantTable {
        metadata_columns: metadata.columns.clone(),
        rows,
    })
}
