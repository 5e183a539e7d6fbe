// 公开导出的模块，供外部使用
pub mod models;
pub mod sources;
pub mod services;
pub mod config;
pub mod errors;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::series::{DailyClose, DailyReturn, PriceSeries, ReturnSeries, KNOWN_GAP_DATES};
pub use sources::base::{PageRequest, PriceSource};
pub use sources::csv_file::CsvFileSource;
pub use sources::google::GoogleFinanceSource;
pub use services::benchmark_service::{get_benchmark_returns, BenchmarkReturnsFetcher};
pub use config::FetchConfig;
pub use errors::{Result, BenchmarkError};
