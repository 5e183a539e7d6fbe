use benchmark_returns::{BenchmarkReturnsFetcher, FetchConfig, GoogleFinanceSource};
use chrono::NaiveDate;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // 创建数据源和收益率服务
    let config = FetchConfig::new().with_max_pages(10);
    let source = Arc::new(GoogleFinanceSource::new(&config)?);
    let fetcher = BenchmarkReturnsFetcher::new(config, source);

    let first_date = NaiveDate::from_ymd_opt(2020, 1, 1).ok_or("invalid date")?;
    let last_date = NaiveDate::from_ymd_opt(2020, 1, 31).ok_or("invalid date")?;
    let returns = fetcher.get_benchmark_returns("SPY", first_date, last_date).await?;

    println!("SPY 日收益率数量: {}", returns.len());
    println!("{:<26} {:>10}", "日期", "收益率");
    println!("{:-<40}", "");

    // 显示最近5天数据
    for point in returns.iter().rev().take(5) {
        println!("{:<26} {:>9.4}%", point.date.to_rfc3339(), point.value * 100.0);
    }

    println!("\n累计收益率: {:.4}%", returns.cumulative_return() * 100.0);

    Ok(())
}
