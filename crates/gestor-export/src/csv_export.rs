//! CSV export of transactions

use chrono::NaiveDate;
use gestor_core::format::format_plain;
use gestor_core::Transaction;
use std::io::Write;

use crate::error::{ExportError, ExportResult};

pub const CSV_HEADER: [&str; 7] = [
    "ID",
    "Description",
    "Amount",
    "Date",
    "Type",
    "Category",
    "Observations",
];

/// Download name for a CSV export made on `today`
pub fn csv_filename(today: NaiveDate) -> String {
    format!("family-gestor-export-{}.csv", today.format("%Y-%m-%d"))
}

/// Write transactions as CSV, one row each, returning the row count
///
/// Fields containing commas, quotes or newlines are quoted with doubled
/// inner quotes.
pub fn write_transactions_csv<'a, W, I>(writer: W, transactions: I) -> ExportResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    let mut count = 0;
    for t in transactions {
        let amount = format_plain(t.amount);
        let date = t.date.format("%Y-%m-%d").to_string();
        csv_writer.write_record([
            t.id.as_str(),
            t.description.as_str(),
            amount.as_str(),
            date.as_str(),
            t.kind.as_str(),
            t.category.as_str(),
            t.observations.as_deref().unwrap_or(""),
        ])?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Csv {
        message: e.to_string(),
    })?;
    Ok(count)
}

/// Render the whole CSV document in memory
pub fn transactions_csv<'a, I>(transactions: I) -> ExportResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut buffer = Vec::new();
    let count = write_transactions_csv(&mut buffer, transactions)?;
    log::debug!("Rendered CSV with {} rows ({} bytes)", count, buffer.len());
    Ok(buffer)
}
