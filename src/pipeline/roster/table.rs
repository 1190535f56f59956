use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};

use super::RosterError;

/// Raw tabular roster: a header row plus string cells.
///
/// Rows shorter than the header are treated as having empty trailing cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RosterTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Position of the first header matching any alias.
    /// Comparison is case-insensitive and ignores surrounding whitespace.
    pub fn column_index(&self, aliases: &[String]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            let wanted = alias.trim().to_lowercase();
            self.headers
                .iter()
                .position(|h| h.trim().to_lowercase() == wanted)
        })
    }

    /// Cell value, empty when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Parse delimited text (CSV-style quoting, `""` escapes, optional BOM).
    /// The first non-blank record is the header.
    pub fn from_delimited(text: &str, delimiter: char) -> Result<Self, RosterError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut records = parse_records(text, delimiter)?.into_iter();

        let headers = match records.next() {
            Some(h) => h,
            None => return Ok(Self::default()),
        };

        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }

    /// Parse a JSON array of flat objects. Scalar values are coerced to
    /// strings; `null` becomes an empty cell.
    pub fn from_json(text: &str) -> Result<Self, RosterError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let items = value
            .as_array()
            .ok_or_else(|| RosterError::Parse("expected a JSON array of objects".into()))?;

        let mut headers: Vec<String> = Vec::new();
        for item in items {
            let obj = item
                .as_object()
                .ok_or_else(|| RosterError::Parse("expected every roster row to be an object".into()))?;
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = items
            .iter()
            .filter_map(|item| item.as_object())
            .map(|obj| {
                headers
                    .iter()
                    .map(|h| obj.get(h).map(json_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }
}

impl RosterTable {
    /// Read the first sheet of a workbook (.xlsx, .xls, .ods). The first
    /// non-blank row is the header; cells are coerced to strings.
    pub fn from_workbook(path: &Path) -> Result<Self, RosterError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| RosterError::Parse(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| RosterError::Parse("workbook has no sheets".into()))?
            .map_err(|e| RosterError::Parse(e.to_string()))?;

        let mut records = range
            .rows()
            .map(|row| row.iter().map(spreadsheet_cell).collect::<Vec<String>>())
            .filter(|record| record.iter().any(|c| !c.trim().is_empty()));

        let headers = match records.next() {
            Some(h) => h,
            None => return Ok(Self::default()),
        };

        Ok(Self {
            headers,
            rows: records.collect(),
        })
    }
}

/// Whole-number floats print without a fraction, so an id column of
/// `7` reads as "7" rather than "7.0".
fn spreadsheet_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn json_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pick `;` when the header line has more semicolons than commas
/// (spreadsheet exports in pt/fr locales), otherwise `,`.
pub fn detect_delimiter(text: &str) -> char {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        ';'
    } else {
        ','
    }
}

/// Load a roster table from disk, choosing the reader by extension.
pub fn load_table(path: &Path) -> Result<RosterTable, RosterError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let read = || std::fs::read_to_string(path);

    let table = match ext.as_str() {
        "json" => RosterTable::from_json(&read()?)?,
        "xlsx" | "xlsm" | "xls" | "ods" => RosterTable::from_workbook(path)?,
        "tsv" => RosterTable::from_delimited(&read()?, '\t')?,
        "csv" | "txt" => {
            let text = read()?;
            let delimiter = detect_delimiter(&text);
            RosterTable::from_delimited(&text, delimiter)?
        }
        other => return Err(RosterError::UnsupportedRosterFormat(other.to_string())),
    };

    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Roster table loaded"
    );

    Ok(table)
}

/// Split delimited text into records, honoring quoted fields that may
/// contain the delimiter, quotes (`""`) or line breaks. Blank lines are
/// dropped.
fn parse_records(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, RosterError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RosterError::Parse("unterminated quoted field".into()));
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    if record.iter().any(|f| !f.trim().is_empty()) {
        records.push(record);
    }
}
