//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, FailurePolicy};
use crate::models::MetricRecord;
use crate::orchestrator::BatchSummary;

/// 初始化日志
///
/// 设置了 `RUST_LOG` 时以其为准，否则使用 `info`（详细模式下为 `debug`）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - Lighthouse 批量审计");
    info!(
        "⏱️ 页面加载最长等待: {} ms | 设备: {}",
        config.max_wait_for_load_ms,
        config.form_factor.as_str()
    );
    info!("📁 输出目录: {}", config.output_dir.display());
    info!("{}", "=".repeat(60));
}

/// 记录待处理页面信息
///
/// # 参数
/// - `total`: 页面总数
/// - `policy`: 失败策略
pub fn log_urls_loaded(total: usize, policy: FailurePolicy) {
    info!("✓ 共 {} 个待审计的页面", total);
    match policy {
        FailurePolicy::Abort => info!("💡 失败策略: 遇到失败立即停止\n"),
        FailurePolicy::Continue => info!("💡 失败策略: 记录失败并继续\n"),
    }
}

/// 记录页面开始信息
pub fn log_page_start(index: usize, total: usize, url: &str) {
    info!("\n{}", "─".repeat(60));
    info!("[页面 {}/{}] 🔍 开始审计: {}", index, total, url);
}

/// 记录页面完成信息
pub fn log_page_complete(index: usize, total: usize, record: &MetricRecord) {
    info!(
        "[页面 {}/{}] ✓ 性能 {} | 无障碍 {} | 最佳实践 {} | SEO {}",
        index,
        total,
        record.performance,
        record.accessibility,
        record.best_practices,
        record.seo
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 运行统计
/// - `failure_log_path`: 失败记录文件路径
pub fn print_final_stats(summary: &BatchSummary, failure_log_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.succeeded, summary.total);
    info!("❌ 失败: {}", summary.failed);
    info!("{}", "=".repeat(60));
    info!("\n得分已保存至: {}", summary.path.display());
    if summary.failed > 0 {
        info!("失败记录: {}", failure_log_path.display());
    }
}
