use crate::config::FetchConfig;
use crate::models::series::DailyClose;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

/// One page of close prices to fetch, with the knobs the source applies per
/// HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub chunk_size: usize,
    pub retry_count: u32,
    pub pause: Duration,
}

impl PageRequest {
    pub fn new(symbol: &str, start: NaiveDate, end: NaiveDate, config: &FetchConfig) -> Self {
        Self {
            symbol: symbol.to_string(),
            start,
            end,
            chunk_size: config.chunk_size,
            retry_count: config.retry_count,
            pause: config.pause,
        }
    }
}

/// Base trait for close price sources
#[async_trait]
pub trait PriceSource {
    /// Get the name of the provider behind this source
    fn source_name(&self) -> &'static str;

    /// Fetch close prices for `request.symbol` between `request.start` and
    /// `request.end` inclusive. Rows may come back in any order and the
    /// provider may truncate them to its row cap.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<DailyClose>>;
}
