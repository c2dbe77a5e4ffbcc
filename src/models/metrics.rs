//! 指标提取
//!
//! 从一份审计报告中取出固定的分类得分和性能指标，展平成一条记录。

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};
use crate::models::report::LighthouseReport;

/// 需要提取的审计项 ID
pub const TIMING_AUDITS: [&str; 7] = [
    "first-contentful-paint",
    "largest-contentful-paint",
    "speed-index",
    "interactive",
    "server-response-time",
    "total-blocking-time",
    "cumulative-layout-shift",
];

/// 单个页面的指标记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub url: String,
    pub accessibility: f64,
    pub best_practices: f64,
    pub seo: f64,
    pub performance: f64,
    pub first_contentful_paint: f64,
    pub largest_contentful_paint: f64,
    pub speed_index: f64,
    pub interactive: f64,
    pub server_response_time: f64,
    pub total_blocking_time: f64,
    pub cumulative_layout_shift: f64,
}

impl MetricRecord {
    /// 从报告中提取指标
    ///
    /// 分类得分从 [0, 1] 换算到 0–100，性能指标原样复制（不做单位换算）。
    /// 任何一个分类或审计项缺失都会返回 `MissingField`，不会产生半条记录。
    pub fn from_report(url: &str, report: &LighthouseReport) -> AuditResult<Self> {
        Ok(Self {
            url: url.to_string(),
            accessibility: category_score(report, "accessibility")?,
            best_practices: category_score(report, "best-practices")?,
            seo: category_score(report, "seo")?,
            performance: category_score(report, "performance")?,
            first_contentful_paint: audit_value(report, "first-contentful-paint")?,
            largest_contentful_paint: audit_value(report, "largest-contentful-paint")?,
            speed_index: audit_value(report, "speed-index")?,
            interactive: audit_value(report, "interactive")?,
            server_response_time: audit_value(report, "server-response-time")?,
            total_blocking_time: audit_value(report, "total-blocking-time")?,
            cumulative_layout_shift: audit_value(report, "cumulative-layout-shift")?,
        })
    }
}

fn category_score(report: &LighthouseReport, name: &str) -> AuditResult<f64> {
    let category = report
        .categories
        .get(name)
        .ok_or_else(|| AuditError::missing_field(name))?;
    let score = category
        .score
        .ok_or_else(|| AuditError::missing_field(format!("{}.score", name)))?;
    Ok(score * 100.0)
}

fn audit_value(report: &LighthouseReport, id: &str) -> AuditResult<f64> {
    report
        .audits
        .get(id)
        .ok_or_else(|| AuditError::missing_field(id))?
        .numeric_value
        .ok_or_else(|| AuditError::missing_field(format!("{}.numericValue", id)))
}
