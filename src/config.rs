use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::Cli;
use crate::error::{AuditError, AuditResult};
use crate::models::{AuditOptions, FormFactor, LogLevel};

/// 默认审计的页面
pub const DEFAULT_URLS: &[&str] = &[
    "https://trinnylondon.com/uk/",
    "https://www.sephora.co.uk/",
    "https://www.beautypie.com/",
    "https://sokoglam.com/",
    "https://www.thebodyshop.com/",
    "https://uk.glossier.com/",
    "https://milkmakeup.com/",
    "https://kyliejennercosmetics.co.uk/",
    "https://fentybeauty.com/?lang=en-uk",
    "https://www.maccosmetics.co.uk/",
    "https://www.lauramercier.co.uk/",
    "https://www.cerave.co.uk/",
    "https://www.elfcosmetics.co.uk/",
];

/// 单个页面失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 第一个失败就停止（已完成的结果仍会写入文件）
    Abort,
    /// 记录失败占位行并继续
    #[default]
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(AuditError::Config(format!("未知的失败策略: {}", other))),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 待审计的页面（按顺序）
    pub urls: Vec<String>,
    /// CSV 输出目录
    pub output_dir: PathBuf,
    pub failure_policy: FailurePolicy,
    // --- 审计引擎配置 ---
    pub log_level: LogLevel,
    /// 页面加载最长等待时间（毫秒）
    pub max_wait_for_load_ms: u64,
    /// 在页面等待时间之外，留给整个审计进程的额外时间（毫秒）
    pub audit_grace_ms: u64,
    pub form_factor: FormFactor,
    pub lighthouse_bin: String,
    // --- 浏览器配置 ---
    pub chrome_path: Option<PathBuf>,
    pub chrome_flags: Vec<String>,
    /// 浏览器实例目录所在的命名空间
    pub namespace_dir: PathBuf,
    pub startup_timeout_ms: u64,
    // --- 日志配置 ---
    /// 失败记录文件
    pub failure_log_file: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: DEFAULT_URLS.iter().map(|u| u.to_string()).collect(),
            output_dir: PathBuf::from("."),
            failure_policy: FailurePolicy::Continue,
            log_level: LogLevel::Info,
            max_wait_for_load_ms: 60_000,
            audit_grace_ms: 120_000,
            form_factor: FormFactor::None,
            lighthouse_bin: "lighthouse".to_string(),
            chrome_path: None,
            chrome_flags: Vec::new(),
            namespace_dir: std::env::temp_dir().join("lighthouse-batch"),
            startup_timeout_ms: 30_000,
            failure_log_file: PathBuf::from("lighthouse-failures.txt"),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// 用环境变量覆盖已有配置，未设置或无法解析的变量保持原值
    pub fn overlay_env(self) -> Self {
        Self {
            urls: env_var("LIGHTHOUSE_URLS")
                .map(|v| parse_url_list(&v.replace(',', "\n")))
                .unwrap_or(self.urls),
            output_dir: env_var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(self.output_dir),
            failure_policy: env_parse("FAILURE_POLICY").unwrap_or(self.failure_policy),
            log_level: env_parse("LIGHTHOUSE_LOG_LEVEL").unwrap_or(self.log_level),
            max_wait_for_load_ms: env_parse("MAX_WAIT_FOR_LOAD").unwrap_or(self.max_wait_for_load_ms),
            audit_grace_ms: env_parse("AUDIT_GRACE_MS").unwrap_or(self.audit_grace_ms),
            form_factor: env_parse("FORM_FACTOR").unwrap_or(self.form_factor),
            lighthouse_bin: env_var("LIGHTHOUSE_BIN").unwrap_or(self.lighthouse_bin),
            chrome_path: env_var("CHROME_PATH").map(PathBuf::from).or(self.chrome_path),
            chrome_flags: self.chrome_flags,
            namespace_dir: env_var("CHROME_NAMESPACE_DIR").map(PathBuf::from).unwrap_or(self.namespace_dir),
            startup_timeout_ms: env_parse("CHROME_STARTUP_TIMEOUT_MS").unwrap_or(self.startup_timeout_ms),
            failure_log_file: env_var("FAILURE_LOG_FILE").map(PathBuf::from).unwrap_or(self.failure_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，文件中没有的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AuditResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuditError::Config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            AuditError::Config(format!("无法解析配置文件 {}: {}", path.display(), e))
        })
    }

    /// 按 默认值 < 配置文件 < 环境变量 < 命令行 的顺序加载配置
    pub fn load(cli: &Cli) -> AuditResult<Self> {
        let base = match &cli.config {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let mut config = base.overlay_env();
        cli.apply_to(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AuditResult<()> {
        if self.urls.is_empty() {
            return Err(AuditError::Config("没有待审计的 URL".to_string()));
        }
        for raw in &self.urls {
            let parsed = url::Url::parse(raw)
                .map_err(|e| AuditError::Config(format!("无效的 URL {}: {}", raw, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AuditError::Config(format!("只支持 http/https: {}", raw)));
            }
        }
        if self.max_wait_for_load_ms == 0 {
            return Err(AuditError::Config("max_wait_for_load_ms 必须大于 0".to_string()));
        }
        Ok(())
    }

    /// 审计引擎的基础参数（端口为 0，每次审计时再绑定）
    pub fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            log_level: self.log_level,
            max_wait_for_load: self.max_wait_for_load_ms,
            form_factor: self.form_factor,
            ..AuditOptions::default()
        }
    }
}

/// 解析按行分隔的 URL 列表，忽略空行和 `#` 开头的注释
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// 从文件读取 URL 列表
pub fn read_url_file(path: &Path) -> AuditResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AuditError::Config(format!("无法读取 URL 文件 {}: {}", path.display(), e))
    })?;
    Ok(parse_url_list(&content))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// 读取并解析环境变量，值无法解析时记录警告并忽略
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let value = env_var(name)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("⚠️ 环境变量 {} 的值无法解析，已忽略: {}", name, value);
            None
        }
    }
}
