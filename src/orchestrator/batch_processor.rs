//! 批量审计处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量页面的审计和结果汇总。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：查找浏览器和审计引擎
//! 2. **残留清理**：开始前终止上次运行遗留的浏览器进程
//! 3. **顺序处理**：逐个审计页面，前一个完全结束后才开始下一个
//! 4. **失败策略**：按配置决定停止还是记录失败后继续
//! 5. **结果输出**：按输入顺序写入按日期命名的 CSV
//!
//! ## 设计特点
//!
//! - **严格顺序**：不并发，结果顺序与输入顺序一致
//! - **参数不可变**：每个页面使用基础参数的独立副本
//! - **向下委托**：委托 page_auditor 处理单个页面

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::browser::{BrowserLauncher, ChromeLauncher};
use crate::config::{Config, FailurePolicy};
use crate::error::AuditResult;
use crate::models::{AuditOptions, PageResult};
use crate::orchestrator::page_auditor;
use crate::services::{AuditEngine, FailureLog, LighthouseCli, ScoreWriter};
use crate::utils::logging;

/// 一次批量运行的统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// CSV 文件路径
    pub path: PathBuf,
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchSummary {
    fn new(path: PathBuf, results: &[PageResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            path,
            succeeded,
            failed: results.len() - succeeded,
            total: results.len(),
        }
    }
}

/// 批量审计处理器
pub struct BatchProcessor<L, E> {
    launcher: L,
    engine: E,
    options: AuditOptions,
    policy: FailurePolicy,
    writer: ScoreWriter,
    failure_log: Option<FailureLog>,
}

impl<L, E> BatchProcessor<L, E>
where
    L: BrowserLauncher,
    E: AuditEngine,
{
    pub fn new(
        launcher: L,
        engine: E,
        options: AuditOptions,
        policy: FailurePolicy,
        writer: ScoreWriter,
    ) -> Self {
        Self {
            launcher,
            engine,
            options,
            policy,
            writer,
            failure_log: None,
        }
    }

    /// 附加失败记录文件
    pub fn with_failure_log(mut self, failure_log: FailureLog) -> Self {
        self.failure_log = Some(failure_log);
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// 按顺序审计全部页面并写入 CSV
    ///
    /// # 参数
    /// - `urls`: 待审计的页面（按顺序）
    /// - `run_date`: 本次运行开始的日期，决定输出文件名
    ///
    /// # 返回
    /// 返回运行统计；`abort` 策略下遇到失败时，先写入已完成的结果再返回错误
    pub async fn run(&self, urls: &[String], run_date: NaiveDate) -> AuditResult<BatchSummary> {
        match self.launcher.kill_all().await {
            Ok(0) => debug!("没有残留的浏览器进程"),
            Ok(killed) => info!("🧹 已清理 {} 个残留的浏览器进程", killed),
            Err(e) => warn!("⚠️ 清理残留浏览器失败: {}", e),
        }

        let total = urls.len();
        let mut results = Vec::with_capacity(total);

        for (index, url) in urls.iter().enumerate() {
            let page_index = index + 1;
            logging::log_page_start(page_index, total, url);

            match page_auditor::audit_page(&self.launcher, &self.engine, &self.options, url).await
            {
                Ok(record) => {
                    logging::log_page_complete(page_index, total, &record);
                    results.push(PageResult::Scored(record));
                }
                Err(e) => {
                    let reason = e.root_cause().to_string();
                    error!("[页面 {}/{}] ❌ {}", page_index, total, e);
                    self.record_failure(url, &reason);

                    match self.policy {
                        FailurePolicy::Continue => {
                            results.push(PageResult::Failed {
                                url: url.clone(),
                                reason,
                            });
                        }
                        FailurePolicy::Abort => {
                            warn!("⛔ 失败策略为 abort，停止处理剩余 {} 个页面", total - page_index);
                            self.flush_partial(run_date, &results);
                            return Err(e);
                        }
                    }
                }
            }
        }

        let path = self.writer.write(run_date, &results)?;
        Ok(BatchSummary::new(path, &results))
    }

    fn record_failure(&self, url: &str, reason: &str) {
        if let Some(failure_log) = &self.failure_log {
            if let Err(e) = failure_log.write(url, reason) {
                warn!("⚠️ 写入失败记录失败: {}", e);
            }
        }
    }

    /// 中止前保存已完成的结果，写入失败只记录日志
    fn flush_partial(&self, run_date: NaiveDate, results: &[PageResult]) {
        match self.writer.write(run_date, results) {
            Ok(path) => info!("💾 已保存 {} 条已完成的结果: {}", results.len(), path.display()),
            Err(e) => error!("保存已完成的结果失败: {}", e),
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    processor: BatchProcessor<ChromeLauncher, LighthouseCli>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let launcher = ChromeLauncher::new(&config)?;
        let engine = LighthouseCli::new(&config)?;
        let processor = BatchProcessor::new(
            launcher,
            engine,
            config.audit_options(),
            config.failure_policy,
            ScoreWriter::new(&config.output_dir),
        )
        .with_failure_log(FailureLog::new(&config.failure_log_file));

        Ok(Self { config, processor })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchSummary> {
        let run_date = chrono::Local::now().date_naive();
        logging::log_urls_loaded(self.config.urls.len(), self.config.failure_policy);

        let summary = self.processor.run(&self.config.urls, run_date).await?;

        // 输出最终统计
        logging::print_final_stats(&summary, &self.config.failure_log_file);

        Ok(summary)
    }
}
