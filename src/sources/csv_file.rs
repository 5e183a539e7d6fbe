use crate::models::series::DailyClose;
use crate::errors::Result;
use crate::sources::base::{PageRequest, PriceSource};
use crate::sources::csv_format::parse_close_csv;
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;

/// Reads `<base_path>/<symbol>.csv`, in the same layout the HTTP provider
/// serves. An optional row cap keeps only the most recent rows of each page.
pub struct CsvFileSource {
    base_path: PathBuf,
    row_cap: Option<usize>,
}

impl CsvFileSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            row_cap: None,
        }
    }

    pub fn with_row_cap(mut self, row_cap: usize) -> Self {
        self.row_cap = Some(row_cap);
        self
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

#[async_trait]
impl PriceSource for CsvFileSource {
    fn source_name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<DailyClose>> {
        let path = self.csv_path(&request.symbol);
        let content = tokio::fs::read(&path).await.map_err(|e| {
            std::io::Error::new(e.kind(), format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rows: Vec<DailyClose> = parse_close_csv(content.as_slice())?
            .into_iter()
            .filter(|row| row.date >= request.start && row.date <= request.end)
            .collect();
        rows.sort_by_key(|row| row.date);

        if let Some(cap) = self.row_cap {
            if rows.len() > cap {
                debug!("Truncating {} rows for {} to {}", rows.len(), request.symbol, cap);
                let excess = rows.len() - cap;
                rows.drain(..excess);
            }
        }

        Ok(rows)
    }
}
