use crate::models::series::DailyClose;
use crate::errors::{Result, BenchmarkError};
use crate::util;
use std::io::Read;

/// Parses a provider CSV (`Date,Open,High,Low,Close,Volume`) into close rows.
///
/// Columns are located by header name, so extra or reordered columns are fine.
/// A close of `-` or an empty cell is kept as a missing value.
pub fn parse_close_csv<R: Read>(input: R) -> Result<Vec<DailyClose>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
    };
    let date_idx = column("Date")
        .ok_or_else(|| BenchmarkError::DataError("missing Date column".to_string()))?;
    let close_idx = column("Close")
        .ok_or_else(|| BenchmarkError::DataError("missing Close column".to_string()))?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;

        let date_str = record.get(date_idx).ok_or_else(|| {
            BenchmarkError::DataError(format!("row without date: {:?}", record))
        })?;
        let date = util::parse_price_date(date_str)?;

        let close = match record.get(close_idx) {
            None | Some("") | Some("-") => None,
            Some(value) => Some(value.parse::<f64>().map_err(|e| {
                BenchmarkError::DataError(format!("invalid close value '{}' on {}: {}", value, date, e))
            })?),
        };

        rows.push(DailyClose { date, close });
    }

    Ok(rows)
}
