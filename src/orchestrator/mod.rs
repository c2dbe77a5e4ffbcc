//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量审计处理器
//! - 管理应用生命周期（初始化、运行）
//! - 开始前清理残留的浏览器进程
//! - 严格按顺序逐个审计页面
//! - 按失败策略处理单个页面的失败
//! - 写入 CSV 并输出统计信息
//!
//! ### `page_auditor` - 单个页面审计
//! - 启动浏览器、审计、终止浏览器
//! - 提取指标记录
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<URL>)
//!     ↓
//! page_auditor (处理单个 URL)
//!     ↓
//! browser (启动器) + services (审计引擎 / CSV / 失败记录)
//!     ↓
//! models (报告 → 指标记录)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，page_auditor 管单个
//! 2. **资源隔离**：每个页面独占一个浏览器，用完立即终止
//! 3. **向下依赖**：编排层 → services / browser → models

pub mod batch_processor;
pub mod page_auditor;

// 重新导出主要类型
pub use batch_processor::{App, BatchProcessor, BatchSummary};
pub use page_auditor::audit_page;
