//! On-disk line format and the write path.

pub mod codec;
pub mod sink;
pub mod writer;

pub use codec::{encode_line, parse_ledger, read_ledger, ParsedLedger};
pub use sink::{FileSink, LineSink};
pub use writer::append_line;
