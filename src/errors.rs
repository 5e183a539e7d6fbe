use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Remote data error: {url} returned HTTP status {status}")]
    RemoteDataError { url: String, status: u16 },

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Pagination for {symbol} stopped after {pages} pages without reaching the end of data")]
    PaginationLimit { symbol: String, pages: usize },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, BenchmarkError>;

// 用于从字符串创建错误
impl From<String> for BenchmarkError {
    fn from(s: String) -> Self {
        BenchmarkError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for BenchmarkError {
    fn from(s: &str) -> Self {
        BenchmarkError::Unknown(s.to_string())
    }
}

impl From<arrow::error::ArrowError> for BenchmarkError {
    fn from(e: arrow::error::ArrowError) -> Self {
        BenchmarkError::ArrowError(e.to_string())
    }
}
