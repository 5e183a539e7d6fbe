use crate::config::FetchConfig;
use crate::models::series::DailyClose;
use crate::errors::{Result, BenchmarkError};
use crate::sources::base::{PageRequest, PriceSource};
use crate::sources::csv_format::parse_close_csv;
use crate::util;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

/// 原地址 http://www.google.com/finance/historical 已返回错误数据
pub const GOOGLE_FINANCE_URL: &str = "https://finance.google.com/finance/historical";

/// Google Finance 历史行情抓取器，返回CSV格式的日线数据
pub struct GoogleFinanceSource {
    client: Client,
    base_url: String,
}

impl GoogleFinanceSource {
    /// 创建新的 Google Finance 数据源
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(BenchmarkError::RequestError)?;

        Ok(Self {
            client,
            base_url: GOOGLE_FINANCE_URL.to_string(),
        })
    }

    /// Point the source at another endpoint speaking the same protocol.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    fn query_params(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("q", symbol.to_string()),
            ("startdate", util::format_query_date(start)),
            ("enddate", util::format_query_date(end)),
            ("output", "csv".to_string()),
        ]
    }

    /// 发送请求，失败时最多重试 `retry_count` 次，每次间隔 `pause`
    async fn get_with_retry(
        &self,
        params: &[(&'static str, String)],
        retry_count: u32,
        pause: Duration,
    ) -> Result<String> {
        let attempts = retry_count + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.client.get(&self.base_url).query(params).send().await {
                Ok(response) if response.status().is_success() => match response.text().await {
                    Ok(text) => return Ok(text),
                    Err(e) => last_error = Some(BenchmarkError::RequestError(e)),
                },
                Ok(response) => {
                    last_error = Some(BenchmarkError::RemoteDataError {
                        url: response.url().to_string(),
                        status: response.status().as_u16(),
                    });
                }
                Err(e) => last_error = Some(BenchmarkError::RequestError(e)),
            }

            if attempt < attempts {
                if let Some(e) = &last_error {
                    warn!("请求失败 (第 {}/{} 次): {}", attempt, attempts, e);
                }
                tokio::time::sleep(pause).await;
            }
        }

        Err(last_error.unwrap_or_else(|| BenchmarkError::Unknown("no request was attempted".to_string())))
    }
}

#[async_trait]
impl PriceSource for GoogleFinanceSource {
    fn source_name(&self) -> &'static str {
        "google"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<DailyClose>> {
        let mut rows = Vec::new();

        // 按 chunk_size 天切分请求区间，每次HTTP请求最多返回 chunk_size 行
        for (start, end) in util::chunk_windows(request.start, request.end, request.chunk_size) {
            debug!("获取 {} 从 {} 到 {} 的收盘价", request.symbol, start, end);

            let params = Self::query_params(&request.symbol, start, end);
            let text = self.get_with_retry(&params, request.retry_count, request.pause).await?;
            let chunk = parse_close_csv(text.as_bytes())?;

            debug!("获取到 {} 条记录", chunk.len());
            rows.extend(chunk);
        }

        Ok(rows)
    }
}
