//! Reading and writing whole variant-call files.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::header::{VcfHeader, parse_column_line};
use crate::input::open_input;
use crate::record::{VariantRecord, parse_record};

/// A fully parsed variant-call file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VcfFile {
    pub header: VcfHeader,
    /// Data rows in file order.
    pub records: Vec<VariantRecord>,
}

impl VcfFile {
    /// Write header and records in VCF text layout.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        for line in &self.header.meta {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer, "{}", self.header.column_line())?;
        for record in &self.records {
            writeln!(writer, "{}", record.to_line())?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Parse a variant-call file from a reader.
///
/// Leading `##` lines are kept as meta lines, the next non-blank line is the
/// column header and every following non-blank line is a data row. `source`
/// names the input in error messages.
pub fn parse_vcf<R: BufRead>(reader: R, source: &str) -> Result<VcfFile> {
    let mut header: Option<VcfHeader> = None;
    let mut meta = Vec::new();
    let mut records = Vec::new();
    let mut line_no = 0;

    for line in reader.lines() {
        line_no += 1;
        let line = line
            .map_err(|e| Error::parse(source, line_no, format!("unreadable line: {}", e)))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if let Some(h) = &header {
            records.push(parse_record(line, h.width(), source, line_no)?);
        } else if line.starts_with("##") {
            meta.push(line.to_string());
        } else {
            let columns = parse_column_line(line, source, line_no)?;
            header = Some(VcfHeader {
                meta: std::mem::take(&mut meta),
                columns,
            });
        }
    }

    let header = header
        .ok_or_else(|| Error::parse(source, line_no, "no #CHROM header line found"))?;

    Ok(VcfFile { header, records })
}

/// Read and parse one variant-call file, plain or gzip-compressed.
pub fn read_vcf<P: AsRef<Path>>(path: P) -> Result<VcfFile> {
    let path = path.as_ref();
    tracing::debug!("reading variant calls from {:?}", path);
    parse_vcf(open_input(path)?, &path.display().to_string())
}
