//! The log decoder capability.
//!
//! Decoding a binary log is delegated to an external tool. The core only
//! depends on the row contract: a header plus string cells, filtered by
//! record type tag. Anything that honours that contract can stand in for
//! the real decoder, which keeps extraction and comparison testable with
//! synthetic tables.

pub mod mavlogdump;
pub mod table;

use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::error::DecodeError;

pub use mavlogdump::MavlogdumpDecoder;
pub use table::parse_csv_table;

/// One decoded row, as text cells in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the decoder output, for diagnostics.
    pub line: usize,
    pub cells: Vec<String>,
}

/// Tabular decoder output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl DecodedTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turns a log file plus a record type filter into a table.
///
/// Implementations must not share scratch state between calls; two
/// decodes may run at the same time.
pub trait LogDecoder: Send + Sync {
    fn decode(
        &self,
        path: &Path,
        tags: &[&str],
        cancel: &CancellationToken,
    ) -> Result<DecodedTable, DecodeError>;
}

impl<D: LogDecoder + ?Sized> LogDecoder for &D {
    fn decode(
        &self,
        path: &Path,
        tags: &[&str],
        cancel: &CancellationToken,
    ) -> Result<DecodedTable, DecodeError> {
        (**self).decode(path, tags, cancel)
    }
}

impl<D: LogDecoder + ?Sized> LogDecoder for Box<D> {
    fn decode(
        &self,
        path: &Path,
        tags: &[&str],
        cancel: &CancellationToken,
    ) -> Result<DecodedTable, DecodeError> {
        (**self).decode(path, tags, cancel)
    }
}
