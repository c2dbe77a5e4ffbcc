//! 单个页面审计 - 编排层
//!
//! 一个页面的完整周期：启动浏览器 → 审计 → 终止浏览器 → 提取指标。
//! 浏览器在任何退出路径上都会被终止。

use tracing::{debug, warn};

use crate::browser::{BrowserHandle, BrowserLauncher};
use crate::error::AuditResult;
use crate::models::{AuditOptions, MetricRecord};
use crate::services::AuditEngine;

/// 审计单个页面
///
/// # 参数
/// - `launcher`: 浏览器启动器，每次调用启动一个新的浏览器
/// - `engine`: 审计引擎
/// - `base_options`: 基础审计参数，本函数只复制不修改
/// - `url`: 页面地址
///
/// # 返回
/// 成功时返回指标记录；失败时返回带 URL 的 `AuditFailed`
pub async fn audit_page<L, E>(
    launcher: &L,
    engine: &E,
    base_options: &AuditOptions,
    url: &str,
) -> AuditResult<MetricRecord>
where
    L: BrowserLauncher + ?Sized,
    E: AuditEngine + ?Sized,
{
    let mut handle = launcher.launch().await.map_err(|e| e.for_url(url))?;
    debug!("审计参数绑定端口: {}", handle.port());

    let options = base_options.with_port(handle.port());
    let outcome = engine.audit(url, &options).await;

    // 无论审计成功与否都终止浏览器
    if let Err(e) = handle.kill().await {
        warn!("⚠️ {}", e);
    }

    let report = outcome.map_err(|e| e.for_url(url))?;
    MetricRecord::from_report(url, &report).map_err(|e| e.for_url(url))
}
