use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::core::transaction::Transaction;
use crate::parsing::{decode_text, find_column, ParseError};
use crate::utils::validation::check_row_limit;

const DATE_COLUMNS: &[&str] = &["buchungstag", "booking_date", "date"];
const PAYER_COLUMNS: &[&str] = &[
    "beguenstigter/zahlungspflichtiger",
    "begünstigter/zahlungspflichtiger",
    "payer_name",
    "payer",
];
const AMOUNT_COLUMNS: &[&str] = &["betrag", "amount"];
const REFERENCE_COLUMNS: &[&str] = &["verwendungszweck", "reference_text", "reference"];

/// Parse a bank export file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or any error from
/// [`parse_bank_text`].
pub fn parse_bank_file(path: &Path) -> Result<Vec<Transaction>, ParseError> {
    let bytes = std::fs::read(path)?;
    let transactions = parse_bank_text(&decode_text(&bytes))?;
    info!(
        "Read {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(transactions)
}

/// Parse bank export text.
///
/// The delimiter is `;` if the header line contains one, `,` otherwise.
/// Amounts use the German format (`1.234,56`); booking dates may be
/// `DD.MM.YY`, `DD.MM.YYYY`, `YYYY-MM-DD` or a bare `DDMMYY` number.
///
/// # Errors
///
/// Returns `ParseError::MissingColumn` if a required column is absent,
/// `ParseError::InvalidFormat` for unparseable amounts or dates,
/// `ParseError::Csv` for malformed CSV, or `ParseError::TooManyRows`.
pub fn parse_bank_text(text: &str) -> Result<Vec<Transaction>, ParseError> {
    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = if header_line.contains(';') { b';' } else { b',' };
    debug!("Bank export delimiter: '{}'", char::from(delimiter));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let date_col = find_column(&headers, DATE_COLUMNS)
        .ok_or_else(|| ParseError::MissingColumn("Buchungstag".to_string()))?;
    let payer_col = find_column(&headers, PAYER_COLUMNS).ok_or_else(|| {
        ParseError::MissingColumn("Beguenstigter/Zahlungspflichtiger".to_string())
    })?;
    let amount_col = find_column(&headers, AMOUNT_COLUMNS)
        .ok_or_else(|| ParseError::MissingColumn("Betrag".to_string()))?;
    let reference_col = find_column(&headers, REFERENCE_COLUMNS);

    let mut transactions = Vec::new();

    for row in reader.records() {
        let row = row?;
        let line = row.position().map_or(0, csv::Position::line);

        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let field = |col: usize| row.get(col).unwrap_or_default().trim();

        let amount = parse_amount(field(amount_col)).ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "Invalid amount on line {line}: '{}'",
                field(amount_col)
            ))
        })?;

        let booking_date = parse_booking_date(field(date_col)).ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "Invalid booking date on line {line}: '{}'",
                field(date_col)
            ))
        })?;

        if check_row_limit(transactions.len()).is_some() {
            return Err(ParseError::TooManyRows(transactions.len()));
        }

        let mut transaction = Transaction::new(field(payer_col), amount, booking_date);
        if let Some(col) = reference_col {
            transaction = transaction.with_reference(field(col));
        }
        transactions.push(transaction);
    }

    Ok(transactions)
}

/// Parse an amount such as `1.234,56`, `-12,50`, `12.50` or `50,00 EUR`.
///
/// A comma marks the German format (dots are thousands separators);
/// without a comma the value is read as a plain decimal number.
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s
        .trim()
        .trim_end_matches("EUR")
        .trim_end_matches('€')
        .trim()
        .replace(' ', "");

    if s.is_empty() {
        return None;
    }

    let s = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s
    };

    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a booking date in one of the formats found in bank exports.
pub fn parse_booking_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    // Bare numbers are DDMMYY / DDMMYYYY with leading zeros dropped
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        let padded = match s.len() {
            0..=6 => format!("{s:0>6}"),
            7 | 8 => format!("{s:0>8}"),
            _ => return None,
        };
        let format = if padded.len() == 6 { "%d%m%y" } else { "%d%m%Y" };
        return NaiveDate::parse_from_str(&padded, format).ok();
    }

    // Two-digit years first: "%Y" would also accept "25" as the year 25
    ["%d.%m.%y", "%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_semicolon_export() {
        let text = "\
Auftragskonto;Buchungstag;Valutadatum;Beguenstigter/Zahlungspflichtiger;Verwendungszweck;Betrag;Waehrung
DE001;13.01.25;13.01.25;MAX MUSTERMANN;Spende Januar;50,00;EUR
DE001;14.01.25;14.01.25;Stadtwerke Berlin;Abschlag;-1.234,56;EUR
DE001;15.01.2025;15.01.2025;\"Schmidt, Maria\";\"Spende; Danke\";1.000,00;EUR
";
        let transactions = parse_bank_text(text).unwrap();
        assert_eq!(transactions.len(), 3);

        assert_eq!(transactions[0].payer_name, "MAX MUSTERMANN");
        assert_eq!(transactions[0].booking_date, date(2025, 1, 13));
        assert!((transactions[0].amount - 50.0).abs() < 1e-9);
        assert_eq!(transactions[0].reference_text, "Spende Januar");

        assert!((transactions[1].amount + 1234.56).abs() < 1e-9);
        assert!(!transactions[1].is_donation());

        assert_eq!(transactions[2].payer_name, "Schmidt, Maria");
        assert_eq!(transactions[2].reference_text, "Spende; Danke");
        assert!((transactions[2].amount - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_comma_export_with_english_headers() {
        let text = "booking_date,payer_name,amount\n2025-02-01,Erika Musterfrau,25.5\n";
        let transactions = parse_bank_text(text).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].booking_date, date(2025, 2, 1));
        assert!((transactions[0].amount - 25.5).abs() < 1e-9);
        assert_eq!(transactions[0].reference_text, "");
    }

    #[test]
    fn test_missing_column() {
        let text = "Buchungstag;Betrag\n13.01.25;50,00\n";
        let err = parse_bank_text(text).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn(ref c) if c.starts_with("Beguenstigter")));
    }

    #[test]
    fn test_invalid_amount_reports_line() {
        let text = "Buchungstag;Beguenstigter/Zahlungspflichtiger;Betrag\n13.01.25;Max;abc\n";
        let err = parse_bank_text(text).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let text = "Buchungstag;Beguenstigter/Zahlungspflichtiger;Betrag\n13.01.25;Max;5,00\n;;\n";
        assert_eq!(parse_bank_text(text).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50,00"), Some(50.0));
        assert_eq!(parse_amount("1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("-12,50"), Some(-12.5));
        assert_eq!(parse_amount("12.50"), Some(12.5));
        assert_eq!(parse_amount("50,00 EUR"), Some(50.0));
        assert_eq!(parse_amount("20 €"), Some(20.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_parse_booking_date() {
        assert_eq!(parse_booking_date("13.01.25"), Some(date(2025, 1, 13)));
        assert_eq!(parse_booking_date("13.01.2025"), Some(date(2025, 1, 13)));
        assert_eq!(parse_booking_date("2025-01-13"), Some(date(2025, 1, 13)));
        assert_eq!(parse_booking_date("130125"), Some(date(2025, 1, 13)));
        // Leading zero lost when the export stored the date as a number
        assert_eq!(parse_booking_date("50125"), Some(date(2025, 1, 5)));
        assert_eq!(parse_booking_date("13012025"), Some(date(2025, 1, 13)));
        assert_eq!(parse_booking_date("5012025"), Some(date(2025, 1, 5)));
        assert_eq!(parse_booking_date("32.01.25"), None);
        assert_eq!(parse_booking_date(""), None);
    }
}
