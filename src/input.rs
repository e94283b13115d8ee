//! Opening of input files, plain or gzip-compressed.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{Error, Result};

/// First two bytes of every gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open `path` for line reading.
///
/// Content starting with the gzip magic bytes is decompressed, whatever the
/// file name. Multi-member streams (bgzip) are read to the end. Failures
/// are [`Error::PipelineInput`] naming the path.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| Error::input(path, format!("cannot open: {}", e)))?;
    let mut reader = BufReader::new(file);
    let gzipped = reader
        .fill_buf()
        .map_err(|e| Error::input(path, format!("cannot read: {}", e)))?
        .starts_with(&GZIP_MAGIC);

    if gzipped {
        tracing::debug!("reading {:?} as gzip", path);
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}
