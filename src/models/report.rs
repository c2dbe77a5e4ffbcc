use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lighthouse 审计报告（只保留本程序关心的字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighthouse_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_displayed_url: Option<String>,
    /// 页面加载失败时 Lighthouse 填写的运行错误
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_error: Option<RuntimeError>,
    #[serde(default)]
    pub categories: HashMap<String, CategoryResult>,
    #[serde(default)]
    pub audits: HashMap<String, AuditResultEntry>,
}

/// 分类得分，score 为 [0, 1] 的小数；出错时可能为 null
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub score: Option<f64>,
}

/// 单个审计项
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResultEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl RuntimeError {
    /// 页面在最长等待时间内没有加载完成
    pub fn is_page_hung(&self) -> bool {
        self.code == "PAGE_HUNG"
    }
}

impl LighthouseReport {
    /// 构造只包含一个分类得分的报告（便于测试和拼装）
    pub fn with_category(mut self, name: &str, score: f64) -> Self {
        self.categories.insert(
            name.to_string(),
            CategoryResult {
                title: None,
                score: Some(score),
            },
        );
        self
    }

    /// 追加一个审计项的数值
    pub fn with_audit(mut self, id: &str, numeric_value: f64) -> Self {
        self.audits.insert(
            id.to_string(),
            AuditResultEntry {
                numeric_value: Some(numeric_value),
                display_value: None,
            },
        );
        self
    }
}
