//! VCF data row parser.
//!
//! Parses individual tab-separated data rows into typed `VariantRecord`s and
//! writes them back out in the same column layout.

use crate::attrs::KeyValues;
use crate::error::{Error, Result};
use crate::value::Value;

/// One called variant from one sample file.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    /// Reference sequence name (CHROM column).
    pub chrom: String,
    /// 1-based position (POS column).
    pub pos: u64,
    /// Variant ID (ID column), `None` for `.`.
    pub id: Option<String>,
    /// Reference allele (REF column).
    pub ref_allele: String,
    /// Alternate allele(s) (ALT column), empty for `.`.
    pub alt_alleles: Vec<String>,
    /// Quality score (QUAL column), `None` when missing or not a number.
    pub qual: Option<f64>,
    /// Filter status (FILTER column), empty for `.`.
    pub filter: Vec<String>,
    /// INFO column.
    pub info: KeyValues,
    /// FORMAT column, if the file has genotype columns.
    pub format: Option<String>,
    /// Raw per-sample genotype columns.
    pub genotypes: Vec<String>,
}

fn dot_or(raw: &str) -> Option<&str> {
    if raw == "." { None } else { Some(raw) }
}

fn split_or_empty(raw: &str, sep: char) -> Vec<String> {
    match dot_or(raw) {
        Some(raw) => raw.split(sep).map(|s| s.to_string()).collect(),
        None => vec![],
    }
}

/// Tolerant QUAL parsing: anything that is not a finite non-negative number
/// is treated as missing.
fn parse_qual(raw: &str) -> Option<f64> {
    dot_or(raw)?
        .parse::<f64>()
        .ok()
        .filter(|q| q.is_finite() && *q >= 0.0)
}

/// Parse a single data row.
///
/// # Arguments
///
/// * `row` - One data line, without line terminator
/// * `width` - Number of columns the header declares
/// * `source` - Name of the file, for error messages
/// * `line_no` - 1-based line number, for error messages
pub fn parse_record(
    row: &str,
    width: usize,
    source: &str,
    line_no: usize,
) -> Result<VariantRecord> {
    let fields: Vec<&str> = row.split('\t').collect();

    if fields.len() < width {
        return Err(Error::parse(
            source,
            line_no,
            format!(
                "expected {} columns as declared by the header, got {}",
                width,
                fields.len()
            ),
        ));
    }
    if fields.len() < 8 {
        return Err(Error::parse(
            source,
            line_no,
            format!("expected at least 8 columns, got {}", fields.len()),
        ));
    }

    let pos = fields[1]
        .parse::<u64>()
        .ok()
        .filter(|p| *p >= 1)
        .ok_or_else(|| {
            Error::parse(
                source,
                line_no,
                format!("invalid POS {:?}, expected a positive integer", fields[1]),
            )
        })?;

    Ok(VariantRecord {
        chrom: fields[0].to_string(),
        pos,
        id: dot_or(fields[2]).map(|s| s.to_string()),
        ref_allele: fields[3].to_string(),
        alt_alleles: split_or_empty(fields[4], ','),
        qual: parse_qual(fields[5]),
        filter: split_or_empty(fields[6], ';'),
        info: KeyValues::parse(fields[7]),
        format: fields.get(8).map(|s| s.to_string()),
        genotypes: fields.iter().skip(9).map(|s| s.to_string()).collect(),
    })
}

fn join_or_dot(values: &[String], sep: &str) -> String {
    if values.is_empty() {
        ".".to_string()
    } else {
        values.join(sep)
    }
}

/// Convert a raw INFO value, guessing numbers and comma lists.
fn info_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<f64>() {
        return Value::Number(n);
    }
    if raw.contains(',') {
        return Value::Array(raw.split(',').map(info_value).collect());
    }
    Value::String(raw.to_string())
}

impl VariantRecord {
    /// Write the record back as one tab-separated data line.
    pub fn to_line(&self) -> String {
        let mut fields = vec![
            self.chrom.clone(),
            self.pos.to_string(),
            self.id.clone().unwrap_or_else(|| ".".to_string()),
            self.ref_allele.clone(),
            join_or_dot(&self.alt_alleles, ","),
            self.qual_text(),
            join_or_dot(&self.filter, ";"),
            self.info.to_string(),
        ];
        if let Some(format) = &self.format {
            fields.push(format.clone());
            fields.extend(self.genotypes.iter().cloned());
        }
        fields.join("\t")
    }

    /// QUAL as written in a file, `.` when missing.
    pub fn qual_text(&self) -> String {
        self.qual
            .map(|q| q.to_string())
            .unwrap_or_else(|| ".".to_string())
    }

    /// Whether this is a single-nucleotide substitution.
    pub fn is_snp(&self) -> bool {
        self.ref_allele.len() == 1
            && !self.alt_alleles.is_empty()
            && self.alt_alleles.iter().all(|a| a.len() == 1 && a != "*")
    }

    /// Get a value from the record by field name.
    ///
    /// Supports the fixed columns (CHROM, POS, ID, REF, ALT, QUAL, FILTER,
    /// FORMAT), `SNP` for [`VariantRecord::is_snp`] and INFO keys. A bare
    /// INFO flag is `true`.
    pub fn get(&self, field: &str) -> Value {
        match field {
            "CHROM" => Value::String(self.chrom.clone()),
            "POS" => Value::Number(self.pos as f64),
            "ID" => self.id.clone().into(),
            "REF" => Value::String(self.ref_allele.clone()),
            "ALT" => list_value(&self.alt_alleles),
            "QUAL" => self.qual.into(),
            "FILTER" => list_value(&self.filter),
            "FORMAT" => self.format.clone().into(),
            "SNP" => Value::Bool(self.is_snp()),
            _ => self.info_field(field),
        }
    }

    /// Get an INFO value by key.
    pub fn info_field(&self, key: &str) -> Value {
        match self.info.lookup(key) {
            Some(Some(raw)) => info_value(raw),
            Some(None) => Value::Bool(true),
            None => Value::Missing,
        }
    }
}

fn list_value(values: &[String]) -> Value {
    match values {
        [] => Value::Missing,
        [single] => Value::String(single.clone()),
        many => Value::Array(many.iter().map(|s| Value::String(s.clone())).collect()),
    }
}
