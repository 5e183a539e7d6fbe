use crate::errors::Result;
use crate::util;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

/// 数据源已知缺失的交易日（年, 月, 日）
pub const KNOWN_GAP_DATES: [(i32, u32, u32); 3] = [(2008, 12, 15), (2009, 8, 11), (2012, 2, 2)];

/// Dates for which the provider is known to omit the close.
pub fn known_gap_dates() -> Vec<NaiveDate> {
    KNOWN_GAP_DATES
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

/// 单日收盘价，`None` 表示数据源给出的缺失值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

impl DailyClose {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close: Some(close) }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, close: None }
    }
}

/// Day-over-day fractional change of the close, stamped at midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyReturn {
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// Close prices keyed by date. Always ordered, never duplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    closes: BTreeMap<NaiveDate, Option<f64>>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from rows in accumulation order; a later row replaces an
    /// earlier one with the same date.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = DailyClose>,
    {
        let mut series = Self::new();
        for row in rows {
            series.closes.insert(row.date, row.close);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.closes.contains_key(&date)
    }

    pub fn close(&self, date: NaiveDate) -> Option<f64> {
        self.closes.get(&date).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.closes.iter().map(|(date, close)| (*date, *close))
    }

    /// Earliest date carrying an actual close.
    pub fn first_valid_date(&self) -> Option<NaiveDate> {
        self.closes
            .iter()
            .find(|(_, close)| close.is_some())
            .map(|(date, _)| *date)
    }

    pub fn mark_missing(&mut self, date: NaiveDate) {
        self.closes.insert(date, None);
    }

    /// Overwrites every known gap date inside `[first_date, last_date]` with a
    /// missing marker. Returns how many dates were marked.
    ///
    /// A gap date on or before the earliest fetched close has nothing to be
    /// filled from and is left alone.
    pub fn patch_known_gaps(&mut self, first_date: NaiveDate, last_date: NaiveDate) -> usize {
        let anchor = match self.first_valid_date() {
            Some(date) => date,
            None => return 0,
        };

        let mut patched = 0;
        for date in known_gap_dates() {
            if date > anchor && date >= first_date && date <= last_date {
                self.mark_missing(date);
                patched += 1;
            }
        }
        patched
    }

    /// Replaces each missing close with the most recent earlier close. Leading
    /// missing entries have nothing to carry and stay missing.
    pub fn forward_fill(&mut self) -> usize {
        let mut last_valid: Option<f64> = None;
        let mut filled = 0;
        for close in self.closes.values_mut() {
            match close {
                Some(value) => last_valid = Some(*value),
                None => {
                    if last_valid.is_some() {
                        *close = last_valid;
                        filled += 1;
                    }
                }
            }
        }
        filled
    }

    /// 计算日收益率：ret[t] = price[t] / price[t-1] - 1，丢弃第一天
    pub fn to_returns(&self, tz: Tz) -> Result<ReturnSeries> {
        let entries: Vec<(NaiveDate, Option<f64>)> = self.iter().collect();
        let mut points = Vec::with_capacity(entries.len().saturating_sub(1));

        for pair in entries.windows(2) {
            let (_, prev) = pair[0];
            let (date, current) = pair[1];
            let value = match (prev, current) {
                (Some(p0), Some(p1)) => p1 / p0 - 1.0,
                _ => f64::NAN,
            };
            points.push(DailyReturn {
                date: util::localize_to_utc(date, tz)?,
                value,
            });
        }

        Ok(ReturnSeries { points })
    }
}

/// Ascending daily returns of a benchmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnSeries {
    points: Vec<DailyReturn>,
}

impl ReturnSeries {
    /// Sorts the points and keeps the first occurrence of each timestamp.
    pub fn new(mut points: Vec<DailyReturn>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[DailyReturn] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyReturn> {
        self.points.iter()
    }

    pub fn get(&self, date: DateTime<Utc>) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }

    pub fn first_date(&self) -> Option<DateTime<Utc>> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.date)
    }

    /// Number of returns left undefined because no earlier close existed.
    pub fn undefined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_nan()).count()
    }

    /// Compounded return over the whole series, ignoring undefined points.
    pub fn cumulative_return(&self) -> f64 {
        self.points
            .iter()
            .filter(|p| !p.value.is_nan())
            .fold(1.0, |acc, p| acc * (1.0 + p.value))
            - 1.0
    }
}
