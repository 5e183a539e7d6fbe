#![allow(dead_code)]

use async_trait::async_trait;
use benchmark_returns::{BenchmarkError, DailyClose, PageRequest, PriceSource, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::sync::Mutex;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Weekdays from `start` (inclusive), `count` of them.
pub fn business_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut date = start;
    while days.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(date);
        }
        date += Duration::days(1);
    }
    days
}

pub fn closes(dates: &[NaiveDate], prices: &[f64]) -> Vec<DailyClose> {
    dates
        .iter()
        .zip(prices)
        .map(|(date, price)| DailyClose::new(*date, *price))
        .collect()
}

/// Serves a fixed history the way the provider does: rows inside the
/// requested window, truncated to the most recent `row_cap`, newest first.
pub struct MockHistorySource {
    history: Vec<DailyClose>,
    row_cap: usize,
    pub requests: Mutex<Vec<PageRequest>>,
}

impl MockHistorySource {
    pub fn new(history: Vec<DailyClose>, row_cap: usize) -> Self {
        Self {
            history,
            row_cap,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for MockHistorySource {
    fn source_name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<DailyClose>> {
        self.requests.lock().unwrap().push(request.clone());

        let mut rows: Vec<DailyClose> = self
            .history
            .iter()
            .filter(|row| row.date >= request.start && row.date <= request.end)
            .copied()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(self.row_cap);
        Ok(rows)
    }
}

/// Always answers with a full page of `row_cap` consecutive days ending at
/// the requested end date, whatever the start date says.
pub struct EndlessSource {
    row_cap: usize,
    pub calls: Mutex<usize>,
}

impl EndlessSource {
    pub fn new(row_cap: usize) -> Self {
        Self {
            row_cap,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PriceSource for EndlessSource {
    fn source_name(&self) -> &'static str {
        "endless"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<DailyClose>> {
        *self.calls.lock().unwrap() += 1;
        Ok((0..self.row_cap)
            .map(|i| DailyClose::new(request.end - Duration::days(i as i64), 100.0))
            .collect())
    }
}

pub struct FailingSource;

#[async_trait]
impl PriceSource for FailingSource {
    fn source_name(&self) -> &'static str {
        "failing"
    }

    async fn fetch_page(&self, _request: &PageRequest) -> Result<Vec<DailyClose>> {
        Err(BenchmarkError::RemoteDataError {
            url: "https://example.invalid/historical".to_string(),
            status: 503,
        })
    }
}
