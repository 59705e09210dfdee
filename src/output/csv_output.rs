//! CSV serialization of the harvest tables

use crate::state::{Harvest, PageReport};
use crate::HarvestError;
use serde_json::Value;
use std::io::Write;

/// Text of one table cell
///
/// Strings are written verbatim and null as an empty cell. Numbers and
/// booleans use their JSON text; arrays and objects become compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Writes one row per record, with the field set as the header
///
/// Returns the number of data rows written. A record missing a field gets an
/// empty cell in that column.
pub fn write_record_rows<W: Write>(writer: W, harvest: &Harvest) -> Result<usize, HarvestError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&harvest.fields)?;

    for record in &harvest.records {
        let row = harvest
            .fields
            .iter()
            .map(|field| record.fields.get(field).map(cell_text).unwrap_or_default());
        csv.write_record(row)?;
    }

    csv.flush()?;
    Ok(harvest.records.len())
}

/// Writes the page-count table: `query,Page1,Page2,...`
///
/// There is one column per page number seen on any query and one row per
/// query in input order. A page the query never reached is an empty cell.
pub fn write_page_rows<W: Write>(writer: W, report: &PageReport) -> Result<usize, HarvestError> {
    let pages = report.page_numbers();
    let mut csv = csv::Writer::from_writer(writer);

    let header = std::iter::once("query".to_string())
        .chain(pages.iter().map(|page| format!("Page{}", page)));
    csv.write_record(header)?;

    for row in report.rows() {
        let cells = std::iter::once(row.query.to_string()).chain(pages.iter().map(|page| {
            row.counts
                .get(page)
                .map(|count| count.to_string())
                .unwrap_or_default()
        }));
        csv.write_record(cells)?;
    }

    csv.flush()?;
    Ok(report.rows().len())
}
