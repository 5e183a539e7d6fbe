use crate::config::FetchConfig;
use crate::models::series::{DailyClose, PriceSeries, ReturnSeries};
use crate::sources::base::{PageRequest, PriceSource};
use crate::errors::{Result, BenchmarkError};
use chrono::{Duration, NaiveDate};
use log::{debug, info, warn};
use std::sync::Arc;

/// 基准收益率服务：分页抓取收盘价，修补缺失日期，计算日收益率
///
/// `first_date` is only the anchor close: the first return in the result is
/// for the trading day after it.
pub struct BenchmarkReturnsFetcher {
    config: FetchConfig,
    source: Arc<dyn PriceSource + Send + Sync>,
}

impl BenchmarkReturnsFetcher {
    /// 创建新的收益率服务实例
    pub fn new(config: FetchConfig, source: Arc<dyn PriceSource + Send + Sync>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Collects every close between `first_date` and `last_date`, walking
    /// backwards one page at a time until the source returns a short page.
    ///
    /// The cursor is never compared with `first_date`; a source that keeps
    /// returning full pages is only stopped by `FetchConfig::max_pages`.
    pub async fn fetch_closes(
        &self,
        symbol: &str,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        let mut accumulated: Vec<DailyClose> = Vec::new();
        let mut end_date = last_date;
        let mut pages = 0;

        loop {
            if let Some(max_pages) = self.config.max_pages {
                if pages >= max_pages {
                    return Err(BenchmarkError::PaginationLimit {
                        symbol: symbol.to_string(),
                        pages,
                    });
                }
            }

            let request = PageRequest::new(symbol, first_date, end_date, &self.config);
            let page = self.source.fetch_page(&request).await?;
            pages += 1;

            let page_len = page.len();
            let earliest = page.iter().map(|row| row.date).min();
            info!(
                "Fetched {} rows for {} from {} ({} to {}), page {}",
                page_len, symbol, self.source.source_name(), first_date, end_date, pages
            );

            // 新页覆盖更早的时间段，放在已有数据之前
            let mut merged = page;
            merged.append(&mut accumulated);
            accumulated = merged;

            if page_len < self.config.row_cap {
                break;
            }

            // 可能被数据源的行数上限截断，继续向前翻页
            match earliest {
                Some(date) => end_date = date - Duration::days(1),
                None => break,
            }
            if end_date < first_date {
                debug!("Cursor {} moved before first date {} for {}", end_date, first_date, symbol);
            }
        }

        info!("Collected {} rows for {} in {} pages", accumulated.len(), symbol, pages);
        Ok(accumulated)
    }

    /// Daily returns of `symbol` for the trading days after `first_date` up
    /// to `last_date`, ascending and stamped in UTC.
    pub async fn get_benchmark_returns(
        &self,
        symbol: &str,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<ReturnSeries> {
        let closes = self.fetch_closes(symbol, first_date, last_date).await?;
        self.closes_to_returns(symbol, closes, first_date, last_date)
    }

    /// Single page variant without pagination, kept for comparison. Anything
    /// beyond the provider's row cap is silently lost.
    pub async fn get_benchmark_returns_single_request(
        &self,
        symbol: &str,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<ReturnSeries> {
        let request = PageRequest::new(symbol, first_date, last_date, &self.config);
        let closes = self.source.fetch_page(&request).await?;

        if closes.len() >= self.config.row_cap {
            warn!(
                "Single request for {} returned {} rows and may be truncated at the row cap",
                symbol,
                closes.len()
            );
        }

        self.closes_to_returns(symbol, closes, first_date, last_date)
    }

    fn closes_to_returns(
        &self,
        symbol: &str,
        closes: Vec<DailyClose>,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<ReturnSeries> {
        let mut prices = PriceSeries::from_rows(closes);

        let patched = prices.patch_known_gaps(first_date, last_date);
        let filled = prices.forward_fill();
        debug!("{}: patched {} known gap dates, forward filled {} closes", symbol, patched, filled);

        let returns = prices.to_returns(self.config.price_timezone)?;

        let undefined = returns.undefined_count();
        if undefined > 0 {
            warn!(
                "{} of {} returns for {} have no earlier close to fill from",
                undefined,
                returns.len(),
                symbol
            );
        }

        Ok(returns)
    }
}

/// Convenience wrapper building a one-off fetcher.
pub async fn get_benchmark_returns(
    source: Arc<dyn PriceSource + Send + Sync>,
    config: FetchConfig,
    symbol: &str,
    first_date: NaiveDate,
    last_date: NaiveDate,
) -> Result<ReturnSeries> {
    BenchmarkReturnsFetcher::new(config, source)
        .get_benchmark_returns(symbol, first_date, last_date)
        .await
}
