//! HTML table parsing
//!
//! Turns a `<table>` element into column headers, typed rows and
//! header-keyed row objects.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::extraction::selectors::{element_text, PageSelectors};
use crate::extraction::value::{smart_value, CellValue};

/// A row keyed by column header, in header order
pub type RowObject = Map<String, Value>;

/// A parsed table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Column headers, possibly empty
    pub columns: Vec<String>,
    /// Typed rows; lengths need not match `columns`
    pub rows: Vec<Vec<CellValue>>,
    /// Rows keyed by header; empty when there are no headers or no rows
    pub rows_as_objects: Vec<RowObject>,
}

impl ParsedTable {
    /// Build a table from headers and rows, deriving the row objects
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let rows_as_objects = if columns.is_empty() {
            Vec::new()
        } else {
            rows.iter().map(|row| row_object(&columns, row)).collect()
        };
        Self {
            columns,
            rows,
            rows_as_objects,
        }
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Key a row by header
///
/// Blank headers become `col_{i}`. Missing cells become `""`. When two
/// headers share a name the key keeps its first position and takes the
/// later cell's value.
pub fn row_object(columns: &[String], row: &[CellValue]) -> RowObject {
    let mut obj = Map::new();
    for (i, header) in columns.iter().enumerate() {
        let key = if header.is_empty() {
            format!("col_{}", i)
        } else {
            header.clone()
        };
        let value = row.get(i).map(Value::from).unwrap_or_else(|| Value::from(""));
        obj.insert(key, value);
    }
    obj
}

/// Table parser over a shared selector set
pub struct TableParser<'s> {
    selectors: &'s PageSelectors,
}

impl<'s> TableParser<'s> {
    /// Create a parser
    pub fn new(selectors: &'s PageSelectors) -> Self {
        Self { selectors }
    }

    /// Parse one `<table>` element
    pub fn parse(&self, table: ElementRef<'_>) -> ParsedTable {
        let columns = self.headers(table);
        let rows = self.body_rows(table);
        trace!(columns = columns.len(), rows = rows.len(), "Parsed table");
        ParsedTable::new(columns, rows)
    }

    /// Headers from `<thead>` cells, else the first row's `<th>` cells
    fn headers(&self, table: ElementRef<'_>) -> Vec<String> {
        let sel = self.selectors;

        if let Some(thead) = table.select(&sel.thead).next() {
            let headers: Vec<String> = thead.select(&sel.cells).map(element_text).collect();
            if !headers.is_empty() {
                return headers;
            }
        }

        table
            .select(&sel.rows)
            .next()
            .map(|tr| tr.select(&sel.header_cells).map(element_text).collect())
            .unwrap_or_default()
    }

    /// Data rows under `<tbody>`, or under the table when there is none
    fn body_rows(&self, table: ElementRef<'_>) -> Vec<Vec<CellValue>> {
        let sel = self.selectors;
        let scope = table.select(&sel.tbody).next().unwrap_or(table);

        let mut rows = Vec::new();
        for tr in scope.select(&sel.rows) {
            let has_th = tr.select(&sel.header_cells).next().is_some();
            let has_td = tr.select(&sel.data_cells).next().is_some();
            if has_th && !has_td {
                continue;
            }

            let row: Vec<CellValue> = tr
                .select(&sel.cells)
                .map(|cell| smart_value(&element_text(cell)))
                .collect();
            if row.is_empty() || row.iter().all(CellValue::is_blank) {
                continue;
            }
            rows.push(row);
        }
        rows
    }
}
