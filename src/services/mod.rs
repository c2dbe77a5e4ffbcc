//! 业务能力层
//!
//! - `LighthouseCli` - 调用外部审计引擎
//! - `ScoreWriter` - 写入按日期命名的 CSV
//! - `FailureLog` - 追加写入失败记录

pub mod failure_log;
pub mod lighthouse;
pub mod score_writer;

use async_trait::async_trait;

use crate::error::AuditResult;
use crate::models::{AuditOptions, LighthouseReport};

pub use failure_log::FailureLog;
pub use lighthouse::LighthouseCli;
pub use score_writer::{score_file_name, ScoreWriter, CSV_HEADER};

/// 页面审计引擎
#[async_trait]
pub trait AuditEngine: Send + Sync {
    /// 审计一个页面，`options.port` 必须是当前存活浏览器的端口
    async fn audit(&self, url: &str, options: &AuditOptions) -> AuditResult<LighthouseReport>;
}
