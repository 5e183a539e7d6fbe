use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use crate::errors::{Result, BenchmarkError};

/// 数据源CSV中的日期格式，例如 10-Jan-20
const PROVIDER_DATE_FORMAT: &str = "%d-%b-%y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
/// 请求参数中的日期格式，例如 Jan 10, 2020
const QUERY_DATE_FORMAT: &str = "%b %d, %Y";

// 日期转换工具
pub fn parse_price_date(date_str: &str) -> Result<NaiveDate> {
    let trimmed = date_str.trim();
    NaiveDate::parse_from_str(trimmed, PROVIDER_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT))
        .map_err(BenchmarkError::DateError)
}

pub fn format_query_date(date: NaiveDate) -> String {
    date.format(QUERY_DATE_FORMAT).to_string()
}

/// Interprets `date` as midnight in `tz` and converts it to UTC.
pub fn localize_to_utc(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| BenchmarkError::DataError(format!("Invalid date: {}", date)))?;
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            BenchmarkError::DataError(format!("Midnight of {} does not exist in {}", date, tz))
        })
}

/// Splits `[start, end]` into consecutive windows of at most `chunk_days`
/// calendar days, oldest first. An inverted range yields no windows.
pub fn chunk_windows(start: NaiveDate, end: NaiveDate, chunk_days: usize) -> Vec<(NaiveDate, NaiveDate)> {
    let step = Duration::days(chunk_days.max(1) as i64);
    let mut windows = Vec::new();
    let mut window_start = start;

    while window_start <= end {
        let window_end = (window_start + step - Duration::days(1)).min(end);
        windows.push((window_start, window_end));
        window_start = window_end + Duration::days(1);
    }

    windows
}

// Arrow数据转换工具
pub mod arrow_utils {
    use super::*;
    use crate::models::series::{DailyReturn, ReturnSeries};
    use arrow::record_batch::RecordBatch;
    use arrow_array::{Array, ArrayRef, Float64Array, TimestampMillisecondArray};
    use arrow_ipc::reader::FileReader;
    use arrow_ipc::writer::FileWriter;
    use arrow_schema::{DataType, Field, Schema, TimeUnit};
    use log::info;
    use std::fs::File;
    use std::io::{Cursor, Read, Seek};
    use std::sync::Arc;

    fn return_schema() -> Schema {
        Schema::new(vec![
            Field::new(
                "date",
                DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
                false,
            ),
            Field::new("return", DataType::Float64, false),
        ])
    }

    // 将收益率序列转换为Arrow记录批次
    pub fn return_series_to_record_batch(series: &ReturnSeries) -> Result<RecordBatch> {
        let dates: Vec<i64> = series.iter().map(|p| p.date.timestamp_millis()).collect();
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();

        let date_array: ArrayRef = Arc::new(TimestampMillisecondArray::from(dates).with_timezone("UTC"));
        let value_array: ArrayRef = Arc::new(Float64Array::from(values));

        RecordBatch::try_new(Arc::new(return_schema()), vec![date_array, value_array])
            .map_err(|e| BenchmarkError::ArrowError(e.to_string()))
    }

    // 将收益率序列保存到Arrow文件
    pub fn save_return_series_to_arrow(series: &ReturnSeries, path: &str) -> Result<()> {
        info!("Saving {} returns to {}", series.len(), path);

        let batch = return_series_to_record_batch(series)?;
        let file = File::create(path)?;

        let mut writer = FileWriter::try_new(file, &batch.schema())
            .map_err(|e| BenchmarkError::ArrowError(e.to_string()))?;
        writer.write(&batch)
            .map_err(|e| BenchmarkError::ArrowError(e.to_string()))?;
        writer.finish()
            .map_err(|e| BenchmarkError::ArrowError(e.to_string()))?;

        Ok(())
    }

    // 从Arrow文件读取收益率序列
    pub fn read_return_series_from_arrow(path: &str) -> Result<ReturnSeries> {
        let file = File::open(path)?;
        read_return_series(file)
    }

    // 从内存中读取Arrow数据
    pub fn read_return_series_from_memory(data: &[u8]) -> Result<ReturnSeries> {
        read_return_series(Cursor::new(data))
    }

    fn read_return_series<R: Read + Seek>(source: R) -> Result<ReturnSeries> {
        let reader = FileReader::try_new(source, None)
            .map_err(|e| BenchmarkError::ArrowError(e.to_string()))?;

        let mut points = Vec::new();

        for batch in reader {
            let batch = batch?;

            let date_array = batch.column_by_name("date")
                .and_then(|a| a.as_any().downcast_ref::<TimestampMillisecondArray>())
                .ok_or_else(|| BenchmarkError::ArrowError("Failed to downcast date column".to_string()))?;
            let value_array = batch.column_by_name("return")
                .and_then(|a| a.as_any().downcast_ref::<Float64Array>())
                .ok_or_else(|| BenchmarkError::ArrowError("Failed to downcast return column".to_string()))?;

            for i in 0..date_array.len() {
                let millis = date_array.value(i);
                let date = Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                    BenchmarkError::ArrowError(format!("Timestamp out of range: {}", millis))
                })?;
                points.push(DailyReturn { date, value: value_array.value(i) });
            }
        }

        Ok(ReturnSeries::new(points))
    }
}
