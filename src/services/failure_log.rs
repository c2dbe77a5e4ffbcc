//! 失败记录服务 - 业务能力层
//!
//! 只负责"追加写入失败记录"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{AuditError, AuditResult};

/// 失败记录
///
/// 每个审计失败的页面追加一行：`时间 | URL | 原因`
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 写入一条失败记录
    pub fn write(&self, url: &str, reason: &str) -> AuditResult<()> {
        debug!("写入失败记录: {} | {}", url, reason);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AuditError::write_failure(&self.path, e))?;

        let line = format!(
            "{} | {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            url,
            reason.replace('\n', " ")
        );
        file.write_all(line.as_bytes())
            .map_err(|e| AuditError::write_failure(&self.path, e))
    }
}
