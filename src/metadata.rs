//! Reader for the per-run sample metadata table (e.g. an SRA run table).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::input::open_input;
use crate::stack::SampleNaming;

/// Header names accepted for the run identifier column, in priority order.
pub const ID_COLUMNS: &[&str] = &["run", "run_id", "run_accession", "sample"];

/// Canonical form of a column name used for lookups: lower case, spaces and
/// dashes as underscores.
fn column_key(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}

/// Metadata of one sequencing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadata {
    /// Run identifier, normalized like sample tags.
    pub run_id: String,
    /// All columns of the row, in header order.
    pub fields: IndexMap<String, String>,
}

impl SampleMetadata {
    /// Value of column `name`, matched exactly first and then by its
    /// canonical form (so `cell_line` finds `Cell_Line` and `cell line`).
    pub fn field(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.fields.get(name) {
            return Some(v);
        }
        let wanted = column_key(name);
        self.fields
            .iter()
            .find(|(k, _)| column_key(k) == wanted)
            .map(|(_, v)| v.as_str())
    }

    fn first_field(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|n| self.field(n)).filter(|v| !v.is_empty())
    }

    pub fn organism(&self) -> Option<&str> {
        self.first_field(&["organism", "host"])
    }

    pub fn cell_line(&self) -> Option<&str> {
        self.first_field(&["cell_line"])
    }

    pub fn tissue(&self) -> Option<&str> {
        self.first_field(&["tissue"])
    }

    pub fn treatment(&self) -> Option<&str> {
        self.first_field(&["treatment"])
    }
}

/// All runs of a metadata table, indexed by normalized run identifier.
#[derive(Debug, Clone, Default)]
pub struct SampleMetadataTable {
    /// Header of the table, in file order.
    pub columns: Vec<String>,
    /// The header used as run identifier.
    pub id_column: String,
    rows: Vec<Arc<SampleMetadata>>,
    index: HashMap<String, usize>,
}

impl SampleMetadataTable {
    /// Metadata for a sample tag.
    pub fn get(&self, sample: &str) -> Option<&Arc<SampleMetadata>> {
        self.index.get(sample).map(|&i| &self.rows[i])
    }

    pub fn rows(&self) -> &[Arc<SampleMetadata>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn csv_error(source: &str, err: csv::Error) -> Error {
    let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
    Error::parse(source, line, err.to_string())
}

/// Parse a comma-separated metadata table.
///
/// The run identifier column is the first header matching [`ID_COLUMNS`]
/// case-insensitively. Identifiers are normalized with `naming`; an empty
/// or repeated identifier is a [`Error::Join`] since it makes the join
/// ambiguous.
pub fn parse_metadata<R: Read>(
    reader: R,
    source: &str,
    naming: &SampleNaming,
) -> Result<SampleMetadataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(source, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let id_idx = ID_COLUMNS
        .iter()
        .find_map(|wanted| columns.iter().position(|c| column_key(c) == *wanted))
        .ok_or_else(|| {
            Error::Join(format!(
                "{}: no run identifier column, expected one of {}",
                source,
                ID_COLUMNS.join(", ")
            ))
        })?;

    let mut table = SampleMetadataTable {
        id_column: columns[id_idx].clone(),
        columns: columns.clone(),
        ..Default::default()
    };

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(source, e))?;
        let line_no = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);

        let run_id = naming.normalize(record.get(id_idx).unwrap_or_default());
        if run_id.is_empty() {
            return Err(Error::Join(format!(
                "{}:{}: empty run identifier in column {:?}",
                source, line_no, table.id_column
            )));
        }
        if table.index.contains_key(&run_id) {
            return Err(Error::Join(format!(
                "{}:{}: run identifier {:?} appears more than once",
                source, line_no, run_id
            )));
        }

        let fields = columns
            .iter()
            .zip(record.iter())
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        table.index.insert(run_id.clone(), table.rows.len());
        table.rows.push(Arc::new(SampleMetadata { run_id, fields }));
    }

    Ok(table)
}

/// Read the metadata table at `path`.
pub fn read_metadata<P: AsRef<Path>>(
    path: P,
    naming: &SampleNaming,
) -> Result<SampleMetadataTable> {
    let path = path.as_ref();
    let table = parse_metadata(open_input(path)?, &path.display().to_string(), naming)?;
    tracing::info!(
        "read metadata of {} runs from {:?} (id column {:?})",
        table.len(),
        path,
        table.id_column
    );
    Ok(table)
}
