//! # Lighthouse Batch
//!
//! 批量运行 Lighthouse 审计，并把每个页面的得分写入按日期命名的 CSV 文件
//!
//! ## 架构设计
//!
//! ### ① 浏览器层（Browser）
//! - `browser/` - 持有稀缺资源（浏览器进程），只暴露启动/终止能力
//! - `ChromeLauncher` - 在空闲端口上启动无头 Chrome，并负责清理残留进程
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个页面或一份结果
//! - `LighthouseCli` - 审计能力
//! - `ScoreWriter` - 写 CSV 能力
//! - `FailureLog` - 写失败记录能力
//!
//! ### ③ 数据层（Models）
//! - `models/` - 审计参数、报告结构、指标记录
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理器，按顺序处理全部页面
//! - `orchestrator/page_auditor` - 单个页面：启动 → 审计 → 终止 → 提取
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use browser::{BrowserHandle, BrowserLauncher, ChromeLauncher};
pub use config::{Config, FailurePolicy};
pub use error::{AuditError, AuditResult};
pub use models::{AuditOptions, LighthouseReport, MetricRecord, PageResult};
pub use orchestrator::{audit_page, App, BatchProcessor, BatchSummary};
pub use services::{AuditEngine, LighthouseCli, ScoreWriter};
