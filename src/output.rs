use std::fs::File;
use std::io::Write;

use camino::Utf8Path;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::debug;

use crate::error::LookupError;
use crate::resolver::{ProgressEvent, ProgressSink, ResolutionTable};

pub const CSV_HEADER: [&str; 2] = ["Gene Symbol", "ENSEMBL ID"];

pub struct CsvOutput;

impl CsvOutput {
    /// Plain comma join, no quoting. A symbol containing a comma will shift
    /// its row.
    pub fn write_to<W: Write>(writer: W, table: &ResolutionTable) -> Result<(), csv::Error> {
        let mut out = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);
        out.write_record(CSV_HEADER)?;
        for (symbol, value) in table.rows() {
            out.write_record([symbol, value])?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_file(path: &Utf8Path, table: &ResolutionTable) -> Result<(), LookupError> {
        let to_error = |message: String| LookupError::OutputWrite {
            path: path.to_owned(),
            message,
        };
        let file = File::create(path).map_err(|err| to_error(err.to_string()))?;
        Self::write_to(file, table).map_err(|err| to_error(err.to_string()))
    }
}

/// Prints a notice on stdout for every symbol that could not be resolved.
pub struct ConsoleOutput;

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Resolved {
                symbol,
                id,
                elapsed,
            } => {
                debug!(%symbol, %id, elapsed_ms = elapsed.as_millis() as u64, "resolved");
            }
            ProgressEvent::Unresolved { failure, elapsed } => {
                debug!(
                    symbol = %failure.symbol,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "unresolved"
                );
                println!("No entry found for {}", failure.symbol);
            }
        }
    }
}
