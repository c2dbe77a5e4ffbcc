use std::path::PathBuf;

use thiserror::Error;

/// 审计错误类型
#[derive(Debug, Error)]
pub enum AuditError {
    /// 浏览器进程无法启动
    #[error("浏览器启动失败: {reason}")]
    LaunchFailure { reason: String },

    /// 浏览器进程无法终止
    #[error("终止浏览器进程失败 (端口: {port}): {reason}")]
    TerminationFailure { port: u16, reason: String },

    /// 页面加载超过配置的最长等待时间
    #[error("审计超时 ({url}): 超过 {waited_ms} ms")]
    AuditTimeout { url: String, waited_ms: u64 },

    /// 审计引擎内部错误
    #[error("审计引擎错误 ({url}): {reason}")]
    AuditEngineFailure { url: String, reason: String },

    /// 报告中缺少预期的分类或审计项
    #[error("报告缺少字段: {key}")]
    MissingField { key: String },

    /// 输出文件无法创建或写入
    #[error("写入文件失败 ({}): {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 单个 URL 的审计失败（包装底层原因）
    #[error("审计 {url} 失败: {cause}")]
    AuditFailed {
        url: String,
        #[source]
        cause: Box<AuditError>,
    },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

impl AuditError {
    /// 创建浏览器启动错误
    pub fn launch_failure(reason: impl Into<String>) -> Self {
        AuditError::LaunchFailure {
            reason: reason.into(),
        }
    }

    /// 创建审计引擎错误
    pub fn engine_failure(url: impl Into<String>, reason: impl Into<String>) -> Self {
        AuditError::AuditEngineFailure {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// 创建缺失字段错误
    pub fn missing_field(key: impl Into<String>) -> Self {
        AuditError::MissingField { key: key.into() }
    }

    /// 创建写入失败错误
    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AuditError::WriteFailure {
            path: path.into(),
            source,
        }
    }

    /// 将错误包装为某个 URL 的审计失败
    pub fn for_url(self, url: impl Into<String>) -> Self {
        match self {
            already @ AuditError::AuditFailed { .. } => already,
            cause => AuditError::AuditFailed {
                url: url.into(),
                cause: Box::new(cause),
            },
        }
    }

    /// 取出最底层的错误（跳过 AuditFailed 包装）
    pub fn root_cause(&self) -> &AuditError {
        match self {
            AuditError::AuditFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

// ========== Result 类型别名 ==========

/// 审计结果类型
pub type AuditResult<T> = Result<T, AuditError>;
