//! 得分写入服务
//!
//! 把一次批量运行的全部结果写入 `lighthouse-scores-<DD>-<MM>-<YYYY>.csv`。
//! 同一天重复运行会覆盖同名文件。

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{AuditError, AuditResult};
use crate::models::{MetricRecord, PageResult};

/// CSV 表头（顺序固定）
pub const CSV_HEADER: [&str; 12] = [
    "URL",
    "Accessibility",
    "Best Practices",
    "SEO",
    "Performance",
    "firstContentfulPaint",
    "largestContentfulPaint",
    "speedIndex",
    "interactive",
    "serverResponseTime",
    "totalBlockingTime",
    "cumulativeLayoutShift",
];

/// 失败占位行的标记前缀
pub const FAILED_MARKER: &str = "FAILED";

/// 按日期生成文件名（日-月-年，补零）
pub fn score_file_name(date: NaiveDate) -> String {
    format!("lighthouse-scores-{}.csv", date.format("%d-%m-%Y"))
}

pub struct ScoreWriter {
    output_dir: PathBuf,
}

impl ScoreWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 指定日期对应的输出路径
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(score_file_name(date))
    }

    /// 写入全部结果，返回文件路径
    pub fn write(&self, date: NaiveDate, results: &[PageResult]) -> AuditResult<PathBuf> {
        let path = self.path_for(date);
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| AuditError::write_failure(&self.output_dir, e))?;

        let mut writer = csv::Writer::from_path(&path).map_err(|e| csv_failure(&path, e))?;
        writer
            .write_record(CSV_HEADER)
            .map_err(|e| csv_failure(&path, e))?;
        for result in results {
            writer
                .write_record(row(result))
                .map_err(|e| csv_failure(&path, e))?;
        }
        writer
            .flush()
            .map_err(|e| AuditError::write_failure(&path, e))?;

        debug!("已写入 {} 行到 {}", results.len(), path.display());
        Ok(path)
    }
}

fn row(result: &PageResult) -> Vec<String> {
    match result {
        PageResult::Scored(record) => scored_row(record),
        PageResult::Failed { url, reason } => {
            let mut cells = vec![String::new(); CSV_HEADER.len()];
            cells[0] = url.clone();
            cells[1] = format!("{}: {}", FAILED_MARKER, reason);
            cells
        }
    }
}

fn scored_row(record: &MetricRecord) -> Vec<String> {
    vec![
        record.url.clone(),
        record.accessibility.to_string(),
        record.best_practices.to_string(),
        record.seo.to_string(),
        record.performance.to_string(),
        record.first_contentful_paint.to_string(),
        record.largest_contentful_paint.to_string(),
        record.speed_index.to_string(),
        record.interactive.to_string(),
        record.server_response_time.to_string(),
        record.total_blocking_time.to_string(),
        record.cumulative_layout_shift.to_string(),
    ]
}

fn csv_failure(path: &Path, err: csv::Error) -> AuditError {
    let io = match err.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", other)),
    };
    AuditError::write_failure(path, io)
}
