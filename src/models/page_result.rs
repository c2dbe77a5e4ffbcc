use crate::models::metrics::MetricRecord;

/// 单个页面的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum PageResult {
    /// 审计成功
    Scored(MetricRecord),
    /// 审计失败（占位记录）
    Failed { url: String, reason: String },
}

impl PageResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PageResult::Scored(_))
    }
}
