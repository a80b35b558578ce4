use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::record::DirectoryRecord;
use crate::parsing::{decode_text, detect_delimiter, find_column, ParseError};
use crate::utils::validation::check_row_limit;

const NAME_COLUMNS: &[&str] = &["name", "full_name", "full name"];
const STREET_COLUMNS: &[&str] = &["straße", "strasse", "street"];
const POSTAL_CODE_COLUMNS: &[&str] = &["plz", "postal_code", "postleitzahl", "zip"];
const CITY_COLUMNS: &[&str] = &["ort", "city", "stadt"];

/// Parse an address directory file.
///
/// `.json` files are read as a JSON array of records; anything else as
/// delimited text.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or any error from
/// [`parse_directory_text`] / [`parse_directory_json`].
pub fn parse_directory_file(path: &Path) -> Result<Vec<DirectoryRecord>, ParseError> {
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes);

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let records = match ext.as_deref() {
        Some("json") => parse_directory_json(&text)?,
        _ => parse_directory_text(&text)?,
    };

    let unnamed = records.iter().filter(|r| r.name().is_none()).count();
    if unnamed > 0 {
        warn!(
            "{} of {} directory records in {} have no name",
            unnamed,
            records.len(),
            path.display()
        );
    }

    info!(
        "Read {} directory records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Parse a CSV/TSV directory with a header row.
///
/// The delimiter is detected from the header line. Columns are matched by
/// German or English name, case-insensitively; only the name column is
/// required. An empty name cell yields a record without a name.
///
/// # Errors
///
/// Returns `ParseError::MissingColumn` if there is no name column,
/// `ParseError::Csv` for malformed input, or `ParseError::TooManyRows`.
pub fn parse_directory_text(text: &str) -> Result<Vec<DirectoryRecord>, ParseError> {
    let delimiter = detect_delimiter(text.lines().next().unwrap_or_default());
    debug!("Directory delimiter: '{}'", char::from(delimiter).escape_default());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let name_col = find_column(&headers, NAME_COLUMNS)
        .ok_or_else(|| ParseError::MissingColumn("Name".to_string()))?;
    let street_col = find_column(&headers, STREET_COLUMNS);
    let postal_col = find_column(&headers, POSTAL_CODE_COLUMNS);
    let city_col = find_column(&headers, CITY_COLUMNS);

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;

        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        if check_row_limit(records.len()).is_some() {
            return Err(ParseError::TooManyRows(records.len()));
        }

        let field = |col: Option<usize>| {
            col.and_then(|c| row.get(c))
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let name = field(Some(name_col));
        records.push(DirectoryRecord {
            full_name: (!name.is_empty()).then_some(name),
            street: field(street_col),
            postal_code: field(postal_col),
            city: field(city_col),
        });
    }

    Ok(records)
}

/// Parse a JSON array of directory objects.
///
/// Keys follow the same aliases as the CSV headers. Numbers and booleans are
/// converted to strings; `null` and empty names become absent names.
///
/// # Errors
///
/// Returns `ParseError::Json` for invalid JSON, `ParseError::InvalidFormat`
/// if the document is not an array of objects, or `ParseError::TooManyRows`.
pub fn parse_directory_json(text: &str) -> Result<Vec<DirectoryRecord>, ParseError> {
    let value: Value = serde_json::from_str(text)?;

    let Value::Array(items) = value else {
        return Err(ParseError::InvalidFormat(
            "Directory JSON must be an array of records".to_string(),
        ));
    };

    if check_row_limit(items.len().saturating_sub(1)).is_some() {
        return Err(ParseError::TooManyRows(items.len()));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(fields) = item else {
                return Err(ParseError::InvalidFormat(format!(
                    "Directory entry {index} is not an object"
                )));
            };

            let field = |aliases: &[&str]| {
                fields
                    .iter()
                    .find(|(key, _)| aliases.contains(&key.trim().to_lowercase().as_str()))
                    .and_then(|(_, value)| cell_to_string(value))
            };

            Ok(DirectoryRecord {
                full_name: field(NAME_COLUMNS),
                street: field(STREET_COLUMNS).unwrap_or_default(),
                postal_code: field(POSTAL_CODE_COLUMNS).unwrap_or_default(),
                city: field(CITY_COLUMNS).unwrap_or_default(),
            })
        })
        .collect()
}

/// Records whose name, street, postal code or city contain `term`, ignoring
/// case, paired with their directory index.
///
/// A blank term returns the whole directory.
pub fn search<'a>(
    records: &'a [DirectoryRecord],
    term: &str,
) -> Vec<(usize, &'a DirectoryRecord)> {
    let needle = term.trim().to_lowercase();
    debug!("Searching {} directory records for '{}'", records.len(), needle);

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| needle.is_empty() || record.mentions(&needle))
        .collect()
}

/// String form of a JSON cell, `None` for null or blank values
fn cell_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        // Spreadsheet exports write postal codes as 12345.0
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{f:.0}")
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    };

    (!text.is_empty()).then_some(text)
}
