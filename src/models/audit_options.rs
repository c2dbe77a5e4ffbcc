//! 审计参数
//!
//! 每次审计都基于同一份基础参数复制出新值，只替换端口，
//! 因此不存在共享的可变状态。

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// 报告输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
        }
    }
}

/// 审计引擎日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Error,
    #[default]
    Info,
    Verbose,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Silent => "silent",
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Verbose => "verbose",
        }
    }
}

impl FromStr for LogLevel {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "info" => Ok(LogLevel::Info),
            "verbose" => Ok(LogLevel::Verbose),
            other => Err(AuditError::Config(format!("未知的日志级别: {}", other))),
        }
    }
}

/// 模拟的设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FormFactor {
    /// 不做设备模拟
    #[default]
    None,
    Mobile,
    Desktop,
}

impl FormFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormFactor::None => "none",
            FormFactor::Mobile => "mobile",
            FormFactor::Desktop => "desktop",
        }
    }
}

impl FromStr for FormFactor {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(FormFactor::None),
            "mobile" => Ok(FormFactor::Mobile),
            "desktop" => Ok(FormFactor::Desktop),
            other => Err(AuditError::Config(format!("未知的设备类型: {}", other))),
        }
    }
}

/// 审计分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Performance,
    Accessibility,
    BestPractices,
    Seo,
}

impl Category {
    /// 默认启用的全部分类
    pub const ALL: [Category; 4] = [
        Category::Performance,
        Category::Accessibility,
        Category::BestPractices,
        Category::Seo,
    ];

    /// 报告中使用的分类 ID
    pub fn id(&self) -> &'static str {
        match self {
            Category::Performance => "performance",
            Category::Accessibility => "accessibility",
            Category::BestPractices => "best-practices",
            Category::Seo => "seo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// 审计引擎参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    pub output: OutputFormat,
    pub log_level: LogLevel,
    pub only_categories: Vec<Category>,
    /// 页面加载最长等待时间（毫秒）
    pub max_wait_for_load: u64,
    pub form_factor: FormFactor,
    /// 浏览器调试端口，基础参数中为 0
    pub port: u16,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            output: OutputFormat::Json,
            log_level: LogLevel::Info,
            only_categories: Category::ALL.to_vec(),
            max_wait_for_load: 60_000,
            form_factor: FormFactor::None,
            port: 0,
        }
    }
}

impl AuditOptions {
    /// 复制一份参数并绑定到当前浏览器的端口
    pub fn with_port(&self, port: u16) -> Self {
        Self {
            port,
            ..self.clone()
        }
    }

    /// 以逗号分隔的分类列表
    pub fn categories_csv(&self) -> String {
        self.only_categories
            .iter()
            .map(Category::id)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AuditOptions::default();
        assert_eq!(options.output.as_str(), "json");
        assert_eq!(options.log_level, LogLevel::Info);
        assert_eq!(options.max_wait_for_load, 60_000);
        assert_eq!(options.form_factor.as_str(), "none");
        assert_eq!(
            options.categories_csv(),
            "performance,accessibility,best-practices,seo"
        );
    }

    #[test]
    fn test_with_port_leaves_base_untouched() {
        let base = AuditOptions::default();
        let bound = base.with_port(9222);

        assert_eq!(bound.port, 9222);
        assert_eq!(base.port, 0);
        assert_eq!(bound.only_categories, base.only_categories);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Verbose".parse::<LogLevel>().unwrap(), LogLevel::Verbose);
        assert_eq!(" desktop ".parse::<FormFactor>().unwrap(), FormFactor::Desktop);
        assert!("tablet".parse::<FormFactor>().is_err());
    }
}
