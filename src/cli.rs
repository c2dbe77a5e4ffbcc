use std::path::PathBuf;

use clap::Parser;

use crate::config::{read_url_file, Config, FailurePolicy};
use crate::error::AuditResult;
use crate::models::{FormFactor, LogLevel};

/// 批量运行 Lighthouse 审计并把得分写入按日期命名的 CSV 文件
#[derive(Debug, Default, Parser)]
#[command(name = "lighthouse-batch", version, about)]
pub struct Cli {
    /// 待审计的 URL（不指定时使用配置中的列表）
    pub urls: Vec<String>,

    /// 按行分隔的 URL 文件
    #[arg(long, value_name = "FILE")]
    pub urls_file: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV 输出目录
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// 单个页面失败时的处理策略
    #[arg(long, value_enum)]
    pub policy: Option<FailurePolicy>,

    /// 页面加载最长等待时间（毫秒）
    #[arg(long, value_name = "MS")]
    pub max_wait: Option<u64>,

    /// 审计引擎日志级别
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// 模拟的设备类型
    #[arg(long, value_enum)]
    pub form_factor: Option<FormFactor>,

    /// Chrome 可执行文件路径
    #[arg(long, value_name = "PATH")]
    pub chrome_path: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 用命令行参数覆盖配置
    ///
    /// 位置参数和 `--urls-file` 同时给出时按先后顺序合并。
    pub fn apply_to(&self, config: &mut Config) -> AuditResult<()> {
        let mut urls = self.urls.clone();
        if let Some(path) = &self.urls_file {
            urls.extend(read_url_file(path)?);
        }
        if !urls.is_empty() {
            config.urls = urls;
        }

        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(policy) = self.policy {
            config.failure_policy = policy;
        }
        if let Some(max_wait) = self.max_wait {
            config.max_wait_for_load_ms = max_wait;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        if let Some(form_factor) = self.form_factor {
            config.form_factor = form_factor;
        }
        if let Some(path) = &self.chrome_path {
            config.chrome_path = Some(path.clone());
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        Ok(())
    }
}
