//! Input locations and options of one pipeline run.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::join::MissingMetadata;
use crate::stack::SampleNaming;

/// Everything [`crate::pipeline::run`] needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// GFF-like annotation of the reference.
    pub gff_file_path: PathBuf,
    /// Directory holding one variant-call file per sample.
    pub vcf_dir_path: PathBuf,
    /// Comma-separated run table.
    pub sra_runtable_path: PathBuf,
    pub naming: SampleNaming,
    pub missing_metadata: MissingMetadata,
}

impl PipelineConfig {
    /// Configuration with default naming and [`MissingMetadata::Fail`].
    pub fn new(
        gff_file_path: impl Into<PathBuf>,
        vcf_dir_path: impl Into<PathBuf>,
        sra_runtable_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gff_file_path: gff_file_path.into(),
            vcf_dir_path: vcf_dir_path.into(),
            sra_runtable_path: sra_runtable_path.into(),
            naming: SampleNaming::default(),
            missing_metadata: MissingMetadata::default(),
        }
    }

    /// Check that all inputs exist and have the right kind.
    pub fn validate(&self) -> Result<()> {
        require_file(&self.gff_file_path)?;
        if !self.vcf_dir_path.exists() {
            return Err(Error::input(&self.vcf_dir_path, "directory does not exist"));
        }
        if !self.vcf_dir_path.is_dir() {
            return Err(Error::input(&self.vcf_dir_path, "is not a directory"));
        }
        require_file(&self.sra_runtable_path)
    }
}

fn require_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::input(path, "file does not exist"));
    }
    if !path.is_file() {
        return Err(Error::input(path, "is not a regular file"));
    }
    Ok(())
}
