use benchmark_returns::config::FetchConfig;
use benchmark_returns::models::series::ReturnSeries;
use benchmark_returns::services::benchmark_service::BenchmarkReturnsFetcher;
use benchmark_returns::sources::base::PriceSource;
use benchmark_returns::sources::csv_file::CsvFileSource;
use benchmark_returns::sources::google::GoogleFinanceSource;
use benchmark_returns::util::arrow_utils;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{App, Arg, SubCommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    // 创建基本的命令行应用
    let app = App::new("benchmark_returns")
        .version("1.0.0")
        .author("DataHub Team")
        .about("Fetch benchmark close prices and derive daily returns");

    // 添加子命令
    let app = app.subcommand(
        SubCommand::with_name("fetch")
            .about("Fetch daily returns for a benchmark symbol")
            .arg(
                Arg::with_name("symbol")
                    .short('s')
                    .long("symbol")
                    .value_name("SYMBOL")
                    .help("Benchmark symbol")
                    .takes_value(true)
                    .default_value("SPY"),
            )
            .arg(
                Arg::with_name("start")
                    .long("start")
                    .value_name("DATE")
                    .help("First date (YYYY-MM-DD); its close only anchors the first return")
                    .required(true)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("end")
                    .long("end")
                    .value_name("DATE")
                    .help("Last date (YYYY-MM-DD)")
                    .takes_value(true)
                    .default_value(&today),
            )
            .arg(
                Arg::with_name("source")
                    .long("source")
                    .value_name("SOURCE")
                    .help("Price source (google, csv)")
                    .takes_value(true)
                    .default_value("google"),
            )
            .arg(
                Arg::with_name("csv-dir")
                    .long("csv-dir")
                    .value_name("DIR")
                    .help("Directory holding <SYMBOL>.csv files for the csv source")
                    .takes_value(true)
                    .default_value("data"),
            )
            .arg(
                Arg::with_name("max-pages")
                    .long("max-pages")
                    .value_name("PAGES")
                    .help("Give up after this many full pages")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("timezone")
                    .long("timezone")
                    .value_name("TZ")
                    .help("Timezone the provider dates are expressed in")
                    .takes_value(true)
                    .default_value("UTC"),
            )
            .arg(
                Arg::with_name("single")
                    .long("single")
                    .help("Issue a single request without pagination")
                    .takes_value(false),
            )
            .arg(
                Arg::with_name("output")
                    .short('o')
                    .long("output")
                    .value_name("FILE")
                    .help("Write the returns to an Arrow IPC file")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("format")
                    .short('f')
                    .long("format")
                    .value_name("FORMAT")
                    .help("Output format (table, json)")
                    .takes_value(true)
                    .default_value("table"),
            ),
    ).subcommand(
        SubCommand::with_name("explore")
            .about("Explore returns saved to an Arrow file")
            .arg(
                Arg::with_name("input")
                    .short('i')
                    .long("input")
                    .value_name("FILE")
                    .help("Arrow IPC file written by fetch --output")
                    .required(true)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("limit")
                    .short('l')
                    .long("limit")
                    .value_name("LIMIT")
                    .help("Limit the number of records to display")
                    .takes_value(true)
                    .default_value("10"),
            ),
    );

    let matches = app.get_matches();

    if let Some(matches) = matches.subcommand_matches("fetch") {
        let symbol = matches.value_of("symbol").unwrap_or("SPY");
        let first_date = parse_date(matches.value_of("start").unwrap_or_default())?;
        let last_date = parse_date(matches.value_of("end").unwrap_or(&today))?;

        let tz_name = matches.value_of("timezone").unwrap_or("UTC");
        let tz: Tz = tz_name
            .parse()
            .map_err(|e| anyhow!("Unknown timezone {}: {}", tz_name, e))?;

        // 创建配置
        let mut config = FetchConfig::new().with_price_timezone(tz);
        if let Some(max_pages) = matches.value_of("max-pages") {
            config = config.with_max_pages(max_pages.parse().context("Invalid --max-pages")?);
        }

        // 创建数据源
        let source: Arc<dyn PriceSource + Send + Sync> = match matches.value_of("source").unwrap_or("google") {
            "google" => Arc::new(GoogleFinanceSource::new(&config)?),
            "csv" => {
                let dir = matches.value_of("csv-dir").unwrap_or("data");
                Arc::new(CsvFileSource::new(PathBuf::from(dir)))
            }
            other => return Err(anyhow!("Unknown source: {}", other)),
        };

        let fetcher = BenchmarkReturnsFetcher::new(config, source);
        if let Some(max_pages) = fetcher.config().max_pages {
            info!("Pagination limited to {} pages", max_pages);
        }
        let returns = if matches.is_present("single") {
            fetcher.get_benchmark_returns_single_request(symbol, first_date, last_date).await?
        } else {
            fetcher.get_benchmark_returns(symbol, first_date, last_date).await?
        };

        info!("Computed {} returns for {}", returns.len(), symbol);

        if let Some(output) = matches.value_of("output") {
            arrow_utils::save_return_series_to_arrow(&returns, output)?;
        }

        match matches.value_of("format").unwrap_or("table") {
            "json" => println!("{}", serde_json::to_string_pretty(&returns)?),
            _ => print_table(&returns, returns.len()),
        }
    } else if let Some(matches) = matches.subcommand_matches("explore") {
        let input = matches.value_of("input").unwrap_or_default();
        let limit = matches.value_of("limit")
            .unwrap_or("10")
            .parse::<usize>()
            .unwrap_or(10);

        // 读取数据
        let returns = arrow_utils::read_return_series_from_arrow(input)?;
        info!("Found {} returns in {}", returns.len(), input);
        if let (Some(first), Some(last)) = (returns.first_date(), returns.last_date()) {
            println!("Range: {} to {}", first.to_rfc3339(), last.to_rfc3339());
        }

        print_table(&returns, limit);
        if returns.len() > limit {
            println!("... and {} more records", returns.len() - limit);
        }
        println!("Cumulative return: {:.4}%", returns.cumulative_return() * 100.0);
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", value))
}

fn print_table(returns: &ReturnSeries, limit: usize) {
    println!("{:<26} {:>12}", "Date", "Return");
    println!("{:-<40}", "");
    for point in returns.iter().take(limit) {
        println!("{:<26} {:>11.4}%", point.date.to_rfc3339(), point.value * 100.0);
    }
}
