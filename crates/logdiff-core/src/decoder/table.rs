//! CSV decoder output to [`DecodedTable`].

use csv::{ErrorKind, ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

use super::{DecodedTable, RawRecord};
use crate::error::{DecodeError, DecodeErrorKind};

/// Parse CSV text (first record is the header) into a table.
///
/// Cells are returned verbatim, surrounding whitespace included; only
/// header names are trimmed. Rows with the wrong number of cells are kept
/// as-is; judging them is the extractor's job. A row that is not valid UTF-8 is kept with no
/// cells so it is counted as malformed instead of failing the table.
pub fn parse_csv_table<R: Read>(path: &Path, input: R) -> Result<DecodedTable, DecodeError> {
    let csv_error = |e: csv::Error| {
        DecodeError::new(
            path,
            DecodeErrorKind::Csv {
                reason: e.to_string(),
            },
        )
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line() as usize);
                records.push(RawRecord {
                    line,
                    cells: record.iter().map(str::to_string).collect(),
                });
            }
            Err(e) => match e.kind() {
                ErrorKind::Utf8 { pos, .. } => {
                    let line = pos.as_ref().map_or(0, |p| p.line() as usize);
                    records.push(RawRecord {
                        line,
                        cells: Vec::new(),
                    });
                }
                _ => return Err(csv_error(e)),
            },
        }
    }

    if headers.is_empty() && records.is_empty() {
        return Ok(DecodedTable::default());
    }

    Ok(DecodedTable { headers, records })
}
