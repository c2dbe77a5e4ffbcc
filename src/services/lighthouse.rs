//! Lighthouse 命令行审计引擎
//!
//! 以子进程方式运行 `lighthouse`，连接到已启动的浏览器端口，
//! 从标准输出读取 JSON 报告。

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AuditError, AuditResult};
use crate::models::{AuditOptions, FormFactor, LighthouseReport, LogLevel};
use crate::services::AuditEngine;

/// 失败时保留的 stderr 末尾字符数
const STDERR_TAIL: usize = 800;

pub struct LighthouseCli {
    program: PathBuf,
    /// 页面等待时间之外留给整个进程的时间
    grace: Duration,
}

impl LighthouseCli {
    /// 根据配置创建引擎，找不到 `lighthouse` 命令时返回配置错误
    pub fn new(config: &Config) -> AuditResult<Self> {
        let program = which::which(&config.lighthouse_bin).map_err(|e| {
            AuditError::Config(format!(
                "找不到 {} 命令 (npm install -g lighthouse): {}",
                config.lighthouse_bin, e
            ))
        })?;
        info!("🔎 Lighthouse 路径: {}", program.display());

        Ok(Self {
            program,
            grace: Duration::from_millis(config.audit_grace_ms),
        })
    }

    /// 构造命令行参数
    pub fn build_args(url: &str, options: &AuditOptions) -> Vec<String> {
        let mut args = vec![
            url.to_string(),
            format!("--port={}", options.port),
            format!("--output={}", options.output.as_str()),
            "--output-path=stdout".to_string(),
            format!("--only-categories={}", options.categories_csv()),
            format!("--max-wait-for-load={}", options.max_wait_for_load),
        ];

        match options.log_level {
            LogLevel::Silent | LogLevel::Error => args.push("--quiet".to_string()),
            LogLevel::Verbose => args.push("--verbose".to_string()),
            LogLevel::Info => {}
        }

        match options.form_factor {
            FormFactor::None => args.push("--screenEmulation.disabled".to_string()),
            FormFactor::Desktop => args.push("--preset=desktop".to_string()),
            FormFactor::Mobile => args.push("--form-factor=mobile".to_string()),
        }

        args
    }
}

#[async_trait]
impl AuditEngine for LighthouseCli {
    async fn audit(&self, url: &str, options: &AuditOptions) -> AuditResult<LighthouseReport> {
        let args = Self::build_args(url, options);
        debug!("运行: {} {}", self.program.display(), args.join(" "));

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AuditError::engine_failure(url, format!("无法启动 lighthouse: {}", e)))?;

        // 超时后 future 被丢弃，kill_on_drop 会结束子进程
        let deadline = Duration::from_millis(options.max_wait_for_load) + self.grace;
        let output = match timeout(deadline, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| {
                AuditError::engine_failure(url, format!("等待 lighthouse 退出失败: {}", e))
            })?,
            Err(_) => {
                return Err(AuditError::AuditTimeout {
                    url: url.to_string(),
                    waited_ms: deadline.as_millis() as u64,
                })
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("lighthouse stderr: {}", tail(&stderr, STDERR_TAIL));

        let exit_failure = || {
            AuditError::engine_failure(
                url,
                format!(
                    "lighthouse 退出状态 {}: {}",
                    output.status,
                    tail(&stderr, STDERR_TAIL)
                ),
            )
        };

        match parse_report(url, &output.stdout) {
            // 运行错误时 lighthouse 可能以非零状态退出但仍输出报告
            Ok(report) if output.status.success() || report.runtime_error.is_some() => {
                check_runtime_error(url, report, options.max_wait_for_load)
            }
            Err(e) if output.status.success() => Err(e),
            Ok(_) | Err(_) => Err(exit_failure()),
        }
    }
}

/// 解析 lighthouse 输出的 JSON 报告
pub fn parse_report(url: &str, stdout: &[u8]) -> AuditResult<LighthouseReport> {
    serde_json::from_slice(stdout).map_err(|e| {
        AuditError::engine_failure(url, format!("无法解析 lighthouse 输出: {}", e))
    })
}

/// 把报告中的运行错误转换为审计错误
///
/// `PAGE_HUNG` 表示页面在最长等待时间内没有加载完成。
pub fn check_runtime_error(
    url: &str,
    report: LighthouseReport,
    max_wait_ms: u64,
) -> AuditResult<LighthouseReport> {
    match &report.runtime_error {
        None => Ok(report),
        Some(runtime_error) if runtime_error.is_page_hung() => Err(AuditError::AuditTimeout {
            url: url.to_string(),
            waited_ms: max_wait_ms,
        }),
        Some(runtime_error) => Err(AuditError::engine_failure(
            url,
            format!("{}: {}", runtime_error.code, runtime_error.message),
        )),
    }
}

/// 截取文本末尾（按字符）
fn tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count > max_chars {
        let tail: String = text.chars().skip(count - max_chars).collect();
        format!("...{}", tail.trim())
    } else {
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_defaults() {
        let options = AuditOptions::default().with_port(41_234);
        let args = LighthouseCli::build_args("https://www.sephora.co.uk/", &options);

        assert_eq!(
            args,
            vec![
                "https://www.sephora.co.uk/",
                "--port=41234",
                "--output=json",
                "--output-path=stdout",
                "--only-categories=performance,accessibility,best-practices,seo",
                "--max-wait-for-load=60000",
                "--screenEmulation.disabled",
            ]
        );
    }

    #[test]
    fn test_build_args_log_level_and_form_factor() {
        let options = AuditOptions {
            log_level: LogLevel::Silent,
            form_factor: FormFactor::Desktop,
            ..AuditOptions::default()
        };
        let args = LighthouseCli::build_args("https://uk.glossier.com/", &options);
        assert!(args.contains(&"--quiet".to_string()));
        assert!(args.contains(&"--preset=desktop".to_string()));

        let options = AuditOptions {
            log_level: LogLevel::Verbose,
            form_factor: FormFactor::Mobile,
            ..AuditOptions::default()
        };
        let args = LighthouseCli::build_args("https://uk.glossier.com/", &options);
        assert!(args.contains(&"--verbose".to_string()));
        assert!(args.contains(&"--form-factor=mobile".to_string()));
    }

    #[test]
    fn test_parse_report_runtime_errors() {
        let hung = br#"{"runtimeError":{"code":"PAGE_HUNG","message":"hung"}}"#;
        let report = parse_report("https://a.example/", hung).unwrap();
        let err = check_runtime_error("https://a.example/", report, 60_000).unwrap_err();
        assert!(matches!(err, AuditError::AuditTimeout { waited_ms: 60_000, .. }));

        let dns = br#"{"runtimeError":{"code":"DNS_FAILURE","message":"no such host"}}"#;
        let report = parse_report("https://a.example/", dns).unwrap();
        let err = check_runtime_error("https://a.example/", report, 60_000).unwrap_err();
        match err {
            AuditError::AuditEngineFailure { reason, .. } => assert!(reason.contains("DNS_FAILURE")),
            other => panic!("应为 AuditEngineFailure: {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_garbage() {
        let err = parse_report("https://a.example/", b"Runtime error encountered").unwrap_err();
        assert!(matches!(err, AuditError::AuditEngineFailure { .. }));
    }

    #[test]
    fn test_clean_report_passes_through() {
        let raw = br#"{"categories":{"seo":{"score":0.9}},"audits":{}}"#;
        let report = parse_report("https://a.example/", raw).unwrap();
        let report = check_runtime_error("https://a.example/", report, 60_000).unwrap();
        assert_eq!(report.categories["seo"].score, Some(0.9));
    }

    #[test]
    fn test_tail_keeps_end() {
        assert_eq!(tail("abc", 10), "abc");
        assert_eq!(tail("0123456789", 3), "...789");
    }

    /// 用脚本代替 lighthouse 命令
    #[cfg(unix)]
    fn fake_engine(dir: &std::path::Path, body: &str, config: Config) -> LighthouseCli {
        let script = crate::utils::test_bin::write_script(dir, "fake-lighthouse", body);
        let config = Config {
            lighthouse_bin: script.to_string_lossy().into_owned(),
            ..config
        };
        LighthouseCli::new(&config).unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_audit_past_deadline_is_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            max_wait_for_load_ms: 100,
            audit_grace_ms: 200,
            ..Config::default()
        };
        let options = config.audit_options().with_port(9222);
        let engine = fake_engine(dir.path(), "exec sleep 30", config);

        let started = tokio::time::Instant::now();
        let err = engine.audit("https://a.example/", &options).await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, AuditError::AuditTimeout { waited_ms: 300, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_audit_nonzero_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"echo '{"categories":{},"audits":{}}'
echo boom >&2
exit 2"#;
        let engine = fake_engine(dir.path(), body, Config::default());

        let err = engine
            .audit("https://a.example/", &AuditOptions::default())
            .await
            .unwrap_err();
        match err {
            AuditError::AuditEngineFailure { reason, .. } => {
                assert!(reason.contains("boom"), "{}", reason);
                assert!(reason.contains('2'), "{}", reason);
            }
            other => panic!("应为 AuditEngineFailure: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_audit_nonzero_exit_with_page_hung_is_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"echo '{"runtimeError":{"code":"PAGE_HUNG","message":"hung"}}'
exit 1"#;
        let engine = fake_engine(dir.path(), body, Config::default());

        let err = engine
            .audit("https://a.example/", &AuditOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::AuditTimeout { waited_ms: 60_000, .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_audit_success_returns_report() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"echo '{"categories":{"seo":{"score":0.9}},"audits":{}}'"#;
        let engine = fake_engine(dir.path(), body, Config::default());

        let report = engine
            .audit("https://a.example/", &AuditOptions::default())
            .await
            .unwrap();
        assert_eq!(report.categories["seo"].score, Some(0.9));
    }

    /// 需要本机安装 Chrome 和 lighthouse
    #[tokio::test]
    #[ignore]
    async fn test_audit_real_page() {
        use crate::browser::{BrowserHandle, BrowserLauncher, ChromeLauncher};
        use crate::models::MetricRecord;

        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::default();
        let launcher = ChromeLauncher::new(&config).unwrap();
        let engine = LighthouseCli::new(&config).unwrap();

        let mut handle = launcher.launch().await.unwrap();
        let options = config.audit_options().with_port(handle.port());
        let result = engine.audit("https://example.com/", &options).await;
        handle.kill().await.unwrap();

        let record = MetricRecord::from_report("https://example.com/", &result.unwrap()).unwrap();
        println!("{:?}", record);
        assert!(record.performance <= 100.0);
    }
}
