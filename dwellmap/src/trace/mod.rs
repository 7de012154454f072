//! Daily GPS trace input.
//!
//! One trace file holds the fixes of one subject for one calendar day.

mod error;
mod reader;
mod sample;

pub use error::{TraceError, TraceResult};
pub use reader::{parse_row, TraceReader, HEADER_LINES};
pub use sample::{Sample, SECONDS_PER_DAY};
