mod common;

use approx::assert_relative_eq;
use benchmark_returns::util::arrow_utils;
use benchmark_returns::{
    get_benchmark_returns, BenchmarkError, BenchmarkReturnsFetcher, DailyClose, FetchConfig,
    PriceSeries, ReturnSeries,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use common::*;
use std::sync::Arc;

fn utc_midnight(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

fn long_history(count: usize) -> Vec<DailyClose> {
    let dates = business_days(d(1990, 1, 1), count);
    let prices: Vec<f64> = (0..count).map(|i| 100.0 + i as f64 * 0.01).collect();
    closes(&dates, &prices)
}

#[tokio::test]
async fn spy_january_2020_scenario() {
    let dates = vec![d(2020, 1, 3), d(2020, 1, 6), d(2020, 1, 7), d(2020, 1, 8), d(2020, 1, 9), d(2020, 1, 10)];
    let prices = [322.41, 323.64, 322.73, 324.45, 326.65, 325.71];
    let source = Arc::new(MockHistorySource::new(closes(&dates, &prices), 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source.clone());

    let returns = fetcher
        .get_benchmark_returns("SPY", d(2020, 1, 1), d(2020, 1, 10))
        .await
        .unwrap();

    assert_eq!(source.request_count(), 1);
    assert_eq!(returns.len(), 5);
    let expected_dates: Vec<_> = dates[1..].iter().map(|date| utc_midnight(*date)).collect();
    let actual_dates: Vec<_> = returns.iter().map(|p| p.date).collect();
    assert_eq!(actual_dates, expected_dates);
    assert_relative_eq!(returns.points()[0].value, 323.64 / 322.41 - 1.0, epsilon = 1e-12);
}

#[tokio::test]
async fn n_closes_give_n_minus_one_returns() {
    let dates = business_days(d(2020, 1, 2), 7);
    let prices = [100.0, 101.0, 99.5, 102.0, 103.0, 101.0, 104.0];
    let source = Arc::new(MockHistorySource::new(closes(&dates, &prices), 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source);

    let returns = fetcher
        .get_benchmark_returns("SPY", d(2020, 1, 1), d(2020, 1, 10))
        .await
        .unwrap();

    assert_eq!(returns.len(), 6);
    for (i, point) in returns.iter().enumerate() {
        assert_relative_eq!(point.value, prices[i + 1] / prices[i] - 1.0, epsilon = 1e-12);
    }
}

#[tokio::test]
async fn short_first_page_issues_one_request() {
    let history = long_history(3999);
    let last = history.last().unwrap().date;
    let source = Arc::new(MockHistorySource::new(history, 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source.clone());

    let returns = fetcher.get_benchmark_returns("SPY", d(1989, 12, 1), last).await.unwrap();

    assert_eq!(source.request_count(), 1);
    assert_eq!(returns.len(), 3998);
}

#[tokio::test]
async fn full_first_page_continues_to_earlier_window() {
    let history = long_history(4003);
    let last = history.last().unwrap().date;
    let source = Arc::new(MockHistorySource::new(history.clone(), 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source.clone());

    let closes = fetcher.fetch_closes("SPY", d(1989, 12, 1), last).await.unwrap();
    assert_eq!(source.request_count(), 2);
    assert_eq!(closes.len(), 4003);

    // 第二页的截止日期是第一页最早日期的前一天
    let requests = source.requests();
    assert_eq!(requests[0].end, last);
    assert_eq!(requests[1].end, history[3].date - Duration::days(1));
    assert_eq!(requests[1].start, d(1989, 12, 1));

    let returns = fetcher.get_benchmark_returns("SPY", d(1989, 12, 1), last).await.unwrap();
    assert_eq!(returns.len(), 4002);

    // 边界处既无缺口也无重复
    let expected: Vec<_> = history[1..].iter().map(|row| utc_midnight(row.date)).collect();
    let actual: Vec<_> = returns.iter().map(|p| p.date).collect();
    assert_eq!(actual, expected);
    assert!(actual.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn known_gap_date_uses_previous_close() {
    let dates = vec![d(2009, 8, 7), d(2009, 8, 10), d(2009, 8, 11), d(2009, 8, 12)];
    let prices = [100.0, 101.0, 999.0, 103.0];
    let source = Arc::new(MockHistorySource::new(closes(&dates, &prices), 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source);

    let returns = fetcher
        .get_benchmark_returns("SPY", d(2009, 8, 6), d(2009, 8, 12))
        .await
        .unwrap();

    assert_eq!(returns.get(utc_midnight(d(2009, 8, 11))), Some(0.0));
    let after = returns.get(utc_midnight(d(2009, 8, 12))).unwrap();
    assert_relative_eq!(after, 103.0 / 101.0 - 1.0, epsilon = 1e-12);
}

#[tokio::test]
async fn known_gap_date_missing_from_provider_is_inserted() {
    let dates = vec![d(2012, 2, 1), d(2012, 2, 3)];
    let prices = [50.0, 55.0];
    let source = Arc::new(MockHistorySource::new(closes(&dates, &prices), 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source);

    let returns = fetcher
        .get_benchmark_returns("SPY", d(2012, 1, 31), d(2012, 2, 3))
        .await
        .unwrap();

    assert_eq!(returns.len(), 2);
    assert_eq!(returns.get(utc_midnight(d(2012, 2, 2))), Some(0.0));
    assert_relative_eq!(
        returns.get(utc_midnight(d(2012, 2, 3))).unwrap(),
        0.1,
        epsilon = 1e-12
    );
}

#[tokio::test]
async fn history_starting_after_gap_dates_has_no_invented_returns() {
    let dates = business_days(d(2010, 1, 4), 5);
    let prices = [100.0, 101.0, 102.0, 101.5, 103.0];
    let source = Arc::new(MockHistorySource::new(closes(&dates, &prices), 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source);

    let returns = fetcher
        .get_benchmark_returns("SPY", d(2008, 1, 1), d(2010, 1, 31))
        .await
        .unwrap();

    assert_eq!(returns.len(), 4);
    assert_eq!(returns.undefined_count(), 0);
    assert_eq!(returns.get(utc_midnight(d(2009, 8, 11))), None);
    assert_eq!(returns.first_date(), Some(utc_midnight(d(2010, 1, 5))));
}

#[tokio::test]
async fn max_pages_stops_endless_provider() {
    let source = Arc::new(EndlessSource::new(5));
    let config = FetchConfig::new().with_row_cap(5).with_max_pages(3);
    let fetcher = BenchmarkReturnsFetcher::new(config, source.clone());

    let err = fetcher
        .get_benchmark_returns("SPY", d(2020, 1, 1), d(2020, 3, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, BenchmarkError::PaginationLimit { pages: 3, .. }));
    assert_eq!(source.call_count(), 3);
}

#[tokio::test]
async fn source_errors_propagate_unchanged() {
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), Arc::new(FailingSource));

    let err = fetcher
        .get_benchmark_returns("SPY", d(2020, 1, 1), d(2020, 1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, BenchmarkError::RemoteDataError { status: 503, .. }));
}

#[tokio::test]
async fn empty_source_gives_empty_returns() {
    let source = Arc::new(MockHistorySource::new(Vec::new(), 4000));
    let returns = get_benchmark_returns(source.clone(), FetchConfig::new(), "SPY", d(2020, 1, 1), d(2020, 1, 10))
        .await
        .unwrap();

    assert!(returns.is_empty());
    assert_eq!(source.request_count(), 1);
}

#[tokio::test]
async fn single_request_variant_is_truncated_at_cap() {
    let history = long_history(4003);
    let last = history.last().unwrap().date;
    let source = Arc::new(MockHistorySource::new(history, 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source.clone());

    let returns = fetcher
        .get_benchmark_returns_single_request("SPY", d(1989, 12, 1), last)
        .await
        .unwrap();

    assert_eq!(source.request_count(), 1);
    assert_eq!(returns.len(), 3999);
}

#[tokio::test]
async fn price_timezone_shifts_timestamps() {
    let dates = vec![d(2020, 1, 2), d(2020, 1, 3)];
    let source = Arc::new(MockHistorySource::new(closes(&dates, &[100.0, 101.0]), 4000));
    let config = FetchConfig::new().with_price_timezone(chrono_tz::America::New_York);
    let fetcher = BenchmarkReturnsFetcher::new(config, source);

    let returns = fetcher
        .get_benchmark_returns("SPY", d(2020, 1, 1), d(2020, 1, 3))
        .await
        .unwrap();

    assert_eq!(returns.first_date(), Some(Utc.with_ymd_and_hms(2020, 1, 3, 5, 0, 0).unwrap()));
}

#[tokio::test]
async fn arrow_export_preserves_series() {
    let dates = business_days(d(2020, 1, 2), 5);
    let source = Arc::new(MockHistorySource::new(closes(&dates, &[10.0, 11.0, 12.1, 11.0, 11.5]), 4000));
    let fetcher = BenchmarkReturnsFetcher::new(FetchConfig::new(), source);
    let returns = fetcher
        .get_benchmark_returns("SPY", d(2020, 1, 1), d(2020, 1, 10))
        .await
        .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("returns.arrow");
    let path = path.to_str().unwrap();
    arrow_utils::save_return_series_to_arrow(&returns, path).unwrap();

    let loaded: ReturnSeries = arrow_utils::read_return_series_from_arrow(path).unwrap();
    assert_eq!(loaded, returns);

    let bytes = std::fs::read(path).unwrap();
    let from_memory = arrow_utils::read_return_series_from_memory(&bytes).unwrap();
    assert_eq!(from_memory.len(), 4);
}

#[test]
fn price_series_pipeline_matches_manual_computation() {
    let mut prices = PriceSeries::from_rows(vec![
        DailyClose::new(d(2008, 12, 12), 88.0),
        DailyClose::new(d(2008, 12, 15), 86.0),
        DailyClose::new(d(2008, 12, 16), 90.0),
    ]);
    prices.patch_known_gaps(d(2008, 12, 1), d(2008, 12, 31));
    prices.forward_fill();
    let returns = prices.to_returns(chrono_tz::UTC).unwrap();

    assert_eq!(returns.points()[0].value, 0.0);
    assert_relative_eq!(returns.points()[1].value, 90.0 / 88.0 - 1.0, epsilon = 1e-12);
}
