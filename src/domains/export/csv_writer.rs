// src/domains/export/csv_writer.rs

use crate::domains::export::csv_record::CsvRecord;
use crate::domains::export::table::TableReport;
use crate::domains::export::types::{ExportError, ExportResult};
use chrono::NaiveDate;
use std::io::Write;

/// UTF-8 byte-order marker for Excel compatibility.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes the tabular report as a single CSV artifact: BOM, summary section,
/// one blank row, detail section. Quoting is handled by the `csv` crate, so
/// embedded quotes round-trip through any standard parser.
pub fn write_csv<W: Write>(report: &TableReport, writer: &mut W) -> ExportResult<()> {
    writer
        .write_all(BOM)
        .map_err(|e| ExportError::Io(e.to_string()))?;

    let summary = section_bytes(&report.summary_rows)?;
    writer
        .write_all(&summary)
        .map_err(|e| ExportError::Io(e.to_string()))?;

    writer
        .write_all(b"\n")
        .map_err(|e| ExportError::Io(e.to_string()))?;

    let details = section_bytes(&report.detail_rows)?;
    writer
        .write_all(&details)
        .map_err(|e| ExportError::Io(e.to_string()))?;

    Ok(())
}

/// One CSV section: header row followed by data rows.
pub(crate) fn section_bytes<T: CsvRecord>(rows: &[T]) -> ExportResult<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .from_writer(&mut buffer);

        wtr.write_record(T::headers())
            .map_err(|e| ExportError::Serialization(e.to_string()))?;
        for row in rows {
            wtr.write_record(row.to_csv())
                .map_err(|e| ExportError::Serialization(e.to_string()))?;
        }
        wtr.flush().map_err(|e| ExportError::Io(e.to_string()))?;
    }
    Ok(buffer)
}

/// Date-stamped artifact name, matching the report-archive convention.
pub fn csv_file_name(today: NaiveDate) -> String {
    format!("Relatorio_Tecnico_HV_{}.csv", today.format("%Y-%m-%d"))
}
