//! End-to-end run: annotation, stacking, metadata, join.

use std::path::Path;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::genes::{GeneTable, extract_genes};
use crate::gff::read_gff;
use crate::join::{AnnotatedVariantTable, join};
use crate::metadata::read_metadata;
use crate::stack::stack_directory;

/// Read the gene table of an annotation file.
pub fn load_genes<P: AsRef<Path>>(path: P) -> Result<GeneTable> {
    extract_genes(&read_gff(path)?)
}

/// Run the whole pipeline. All inputs are validated before any is parsed.
pub fn run(config: &PipelineConfig) -> Result<AnnotatedVariantTable> {
    config.validate()?;

    let genes = load_genes(&config.gff_file_path)?;
    let stacked = stack_directory(&config.vcf_dir_path, &config.naming)?;
    let metadata = read_metadata(&config.sra_runtable_path, &config.naming)?;

    tracing::info!(
        "joining {} samples with {} metadata rows",
        stacked.samples.len(),
        metadata.len()
    );
    join(stacked, &genes, &metadata, config.missing_metadata)
}
