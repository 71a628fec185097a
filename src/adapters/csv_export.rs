//! CSV export of the decision history.

use std::io::Write;
use std::path::Path;

use crate::domain::error::QuantsigError;
use crate::domain::history::HistoryRecord;

fn csv_error(e: csv::Error) -> QuantsigError {
    QuantsigError::History {
        reason: format!("CSV export failed: {e}"),
    }
}

/// Write the full record table (every field) to `writer`.
pub fn write_history_csv<W: Write>(
    records: &[HistoryRecord],
    writer: W,
) -> Result<(), QuantsigError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "timestamp",
        "symbol",
        "action",
        "price",
        "confidence",
        "rationale",
        "commentary",
        "data_source",
    ])
    .map_err(csv_error)?;

    for record in records {
        wtr.write_record([
            record.timestamp.to_rfc3339(),
            record.symbol.clone(),
            record.action.to_string(),
            format!("{:.2}", record.price),
            format!("{}%", record.confidence),
            record.rationale.clone(),
            record.commentary.clone().unwrap_or_default(),
            record.data_source.to_string(),
        ])
        .map_err(csv_error)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the history table to a file path.
pub fn export_history_csv(records: &[HistoryRecord], path: &Path) -> Result<(), QuantsigError> {
    let file = std::fs::File::create(path)?;
    write_history_csv(records, file)
}
