use chrono_tz::Tz;
use std::time::Duration;

/// 单次请求最多返回的行数，超过后需要向前翻页
pub const DEFAULT_ROW_CAP: usize = 4000;

/// Settings shared by the fetcher and the price sources it drives.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub chunk_size: usize,
    pub retry_count: u32,
    pub pause: Duration,
    pub row_cap: usize,
    /// `None` keeps paging until a short page arrives, however long that takes.
    pub max_pages: Option<usize>,
    pub price_timezone: Tz,
    pub request_timeout: Duration,
}

impl FetchConfig {
    pub fn new() -> Self {
        Self {
            chunk_size: 25,
            retry_count: 3,
            pause: Duration::from_millis(1),
            row_cap: DEFAULT_ROW_CAP,
            max_pages: None,
            price_timezone: chrono_tz::UTC,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_row_cap(mut self, row_cap: usize) -> Self {
        self.row_cap = row_cap;
        self
    }

    // 防止数据源一直返回满页导致死循环
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_price_timezone(mut self, tz: Tz) -> Self {
        self.price_timezone = tz;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new()
    }
}
