//! Stacking of per-sample variant-call files into one table.
//!
//! Every record is tagged with the sample it came from. The sample tag is
//! derived from the file name by [`SampleNaming`], the same rule the metadata
//! reader applies to run identifiers so that both sides of the join agree.

use std::collections::HashSet;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::input::open_input;
use crate::record::VariantRecord;
use crate::vcf::{VcfFile, parse_vcf};

/// Suffixes stripped from file names and run identifiers by default.
pub const DEFAULT_SUFFIXES: &[&str] = &[
    ".gz",
    ".vcf",
    ".bcf",
    "_final_variants",
    "_variants",
    ".filtered",
];

/// Rule mapping file names and run identifiers to sample tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleNaming {
    /// Suffixes removed repeatedly, in any order, until none matches.
    pub suffixes: Vec<String>,
}

impl Default for SampleNaming {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIXES.iter().map(|s| s.to_string()))
    }
}

impl SampleNaming {
    pub fn new<I: IntoIterator<Item = String>>(suffixes: I) -> Self {
        Self {
            suffixes: suffixes.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// Normalize a raw identifier: trim whitespace, then strip known suffixes.
    ///
    /// A suffix is never stripped if that would leave nothing.
    pub fn normalize(&self, raw: &str) -> String {
        let mut name = raw.trim();
        loop {
            let stripped = self
                .suffixes
                .iter()
                .filter_map(|s| name.strip_suffix(s.as_str()))
                .find(|rest| !rest.is_empty());
            match stripped {
                Some(rest) => name = rest,
                None => break,
            }
        }
        name.to_string()
    }

    /// Sample tag for a file path, from its file name.
    pub fn sample_from_path(&self, path: &Path) -> Result<String> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::input(path, "file name is not valid UTF-8"))?;
        let sample = self.normalize(name);
        if sample.is_empty() {
            return Err(Error::input(path, "cannot derive a sample tag from the file name"));
        }
        Ok(sample)
    }
}

/// One variant record tagged with its sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedVariant {
    pub sample: String,
    pub record: VariantRecord,
}

/// The concatenation of all per-sample files.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackedVariantTable {
    /// Sample tags in stacking order.
    pub samples: Vec<String>,
    /// Records, grouped by sample and in file order within each sample.
    pub rows: Vec<StackedVariant>,
}

impl StackedVariantTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackedVariant> {
        self.rows.iter()
    }

    /// Append all records of one parsed file under `sample`.
    ///
    /// `origin` names the input in the error raised for a repeated tag.
    fn append(
        &mut self,
        sample: String,
        vcf: VcfFile,
        origin: &Path,
        seen: &mut HashSet<String>,
    ) -> Result<()> {
        if !seen.insert(sample.clone()) {
            return Err(Error::input(
                origin,
                format!("sample tag {:?} is produced by more than one file", sample),
            ));
        }
        tracing::debug!("stacking {} records of sample {}", vcf.records.len(), sample);
        self.rows.extend(vcf.records.into_iter().map(|record| StackedVariant {
            sample: sample.clone(),
            record,
        }));
        self.samples.push(sample);
        Ok(())
    }
}

/// Stack already opened sources, each given with its sample tag.
///
/// This is the form to use when inputs do not come from the filesystem.
/// Any source that fails to parse aborts the whole stack.
pub fn stack_readers<I, R>(sources: I) -> Result<StackedVariantTable>
where
    I: IntoIterator<Item = (String, R)>,
    R: BufRead,
{
    let mut table = StackedVariantTable::default();
    let mut seen = HashSet::new();
    for (sample, reader) in sources {
        let origin = PathBuf::from(&sample);
        let vcf = parse_vcf(reader, &sample).map_err(|e| Error::input(&origin, e.to_string()))?;
        table.append(sample, vcf, &origin, &mut seen)?;
    }
    if table.samples.is_empty() {
        return Err(Error::input("<readers>", "no variant-call sources given"));
    }
    Ok(table)
}

/// Stack an explicit list of variant-call files, in the order given.
pub fn stack_files<P: AsRef<Path>>(
    paths: &[P],
    naming: &SampleNaming,
) -> Result<StackedVariantTable> {
    if paths.is_empty() {
        return Err(Error::input("<files>", "no variant-call files given"));
    }

    let mut table = StackedVariantTable::default();
    let mut seen = HashSet::new();
    for path in paths {
        let path = path.as_ref();
        let sample = naming.sample_from_path(path)?;
        let vcf = parse_vcf(open_input(path)?, &path.display().to_string())
            .map_err(|e| Error::input(path, e.to_string()))?;
        table.append(sample, vcf, path, &mut seen)?;
    }

    tracing::info!(
        "stacked {} records from {} samples",
        table.len(),
        table.samples.len()
    );
    Ok(table)
}

/// List the regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Error::input(dir, "directory does not exist"));
    }
    if !dir.is_dir() {
        return Err(Error::input(dir, "is not a directory"));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::input(dir, format!("cannot list: {}", e)))? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(Error::input(dir, "directory contains no files"));
    }
    Ok(files)
}

/// Stack every file of a directory (no recursion).
///
/// The directory must contain only variant-call files; anything else fails
/// to parse and aborts the stack.
pub fn stack_directory<P: AsRef<Path>>(
    dir: P,
    naming: &SampleNaming,
) -> Result<StackedVariantTable> {
    let files = list_files(dir.as_ref())?;
    tracing::debug!("found {} files in {:?}", files.len(), dir.as_ref());
    stack_files(&files, naming)
}
