//! Opening dump files and normalising their lines.
//!
//! Dumps are either one entity per line or a single JSON array with one
//! entity per line. Both shapes reduce to a bare object once the array
//! brackets and the separating commas are stripped.

use std::io::{BufRead, BufReader};

use bzip2::read::MultiBzDecoder;
use camino::Utf8Path;
use log::debug;
use wikitables_fs::open_utf8_file;

use crate::reader::ReadError;

/// Read buffer used for dump files; large lines are common.
const READ_BUFFER_BYTES: usize = 1 << 20;

/// Open `path` for line-oriented reading.
///
/// Files with a `.bz2` extension are decompressed on the fly. Wikidata
/// publishes multistream archives, so every stream is decoded.
pub fn open_dump(path: &Utf8Path) -> Result<Box<dyn BufRead + Send>, ReadError> {
    let file = open_utf8_file(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if is_bzip2(path) {
        debug!("opening {path} as a bzip2 stream");
        let decoder = MultiBzDecoder::new(file);
        return Ok(Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, decoder)));
    }
    Ok(Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, file)))
}

fn is_bzip2(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("bz2"))
}

/// Reduce a raw dump line to the JSON object it carries.
///
/// Returns `None` for blank lines and the array brackets. Leading and
/// trailing separator commas are removed.
///
/// # Examples
/// ```
/// use wikitables_data::preprocess_line;
///
/// let mut line = br#"  {"id":"Q1"},"#.to_vec();
/// assert_eq!(preprocess_line(&mut line).map(|l| &*l), Some(&br#"{"id":"Q1"}"#[..]));
///
/// let mut bracket = b"[".to_vec();
/// assert!(preprocess_line(&mut bracket).is_none());
/// ```
pub fn preprocess_line(line: &mut [u8]) -> Option<&mut [u8]> {
    let (start, end) = content_bounds(line)?;
    line.get_mut(start..end)
}

fn content_bounds(line: &[u8]) -> Option<(usize, usize)> {
    let trimmed = line.trim_ascii();
    if is_structural(trimmed) {
        return None;
    }
    let without_commas = trim_commas(trimmed);
    if is_structural(without_commas) {
        return None;
    }
    let offset = line.len() - line.trim_ascii_start().len();
    let start = offset + (trimmed.len() - trim_leading_commas(trimmed).len());
    Some((start, start + without_commas.len()))
}

fn trim_leading_commas(bytes: &[u8]) -> &[u8] {
    let mut rest = bytes;
    while let Some((b',', tail)) = rest.split_first() {
        rest = tail.trim_ascii_start();
    }
    rest
}

fn trim_commas(bytes: &[u8]) -> &[u8] {
    let mut rest = trim_leading_commas(bytes);
    while let Some((b',', head)) = rest.split_last() {
        rest = head.trim_ascii_end();
    }
    rest
}

fn is_structural(line: &[u8]) -> bool {
    matches!(line, b"" | b"[" | b"]")
}
