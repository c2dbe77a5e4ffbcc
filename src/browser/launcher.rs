use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{connection, executable, process, BrowserHandle, BrowserLauncher};
use crate::config::Config;
use crate::error::{AuditError, AuditResult};

/// 启动时总是附带的参数
const BASE_FLAGS: &[&str] = &[
    "--headless",
    "--disable-gpu",           // 无头模式下禁用 GPU
    "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
    "--disable-dev-shm-usage", // 防止共享内存不足
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-extensions",
    "--disable-sync",
    "--disable-default-apps",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--metrics-recording-only",
    "--mute-audio",
    "--password-store=basic",
    "--use-mock-keychain",
];

/// Chrome 启动器
///
/// 每次 `launch` 都会在一个新的空闲端口上启动独立的无头 Chrome 进程，
/// 用户数据目录和 PID 记录放在命名空间目录下，便于下次运行时清理残留。
pub struct ChromeLauncher {
    executable: PathBuf,
    extra_flags: Vec<String>,
    namespace_dir: PathBuf,
    startup_timeout: Duration,
    live: Arc<AtomicUsize>,
}

impl ChromeLauncher {
    /// 根据配置创建启动器（会立即查找浏览器可执行文件）
    pub fn new(config: &Config) -> AuditResult<Self> {
        let executable = executable::resolve_chrome(config.chrome_path.as_deref())?;
        info!("🔎 浏览器路径: {}", executable.display());

        Ok(Self {
            executable,
            extra_flags: config.chrome_flags.clone(),
            namespace_dir: config.namespace_dir.clone(),
            startup_timeout: Duration::from_millis(config.startup_timeout_ms),
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// 已启动但尚未终止的浏览器数量
    pub fn live_instances(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn command(&self, port: u16, user_data_dir: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(BASE_FLAGS)
            .args(&self.extra_flags)
            .arg(format!("--remote-debugging-port={}", port))
            .arg(format!("--user-data-dir={}", user_data_dir.display()))
            .arg("about:blank")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Handle = ChromeHandle;

    async fn launch(&self) -> AuditResult<ChromeHandle> {
        let port = free_port()?;
        let user_data_dir = process::instance_dir(&self.namespace_dir, port);
        tokio::fs::create_dir_all(&user_data_dir)
            .await
            .map_err(|e| {
                AuditError::launch_failure(format!(
                    "无法创建用户数据目录 {}: {}",
                    user_data_dir.display(),
                    e
                ))
            })?;

        debug!("启动浏览器: {} (端口: {})", self.executable.display(), port);
        let child = self.command(port, &user_data_dir).spawn().map_err(|e| {
            AuditError::launch_failure(format!("启动 {} 失败: {}", self.executable.display(), e))
        })?;

        let pid = child.id();
        if let Some(pid) = pid {
            if let Err(e) = process::write_pid(&user_data_dir, pid) {
                warn!("写入 PID 文件失败 (pid: {}): {}", pid, e);
            }
        }

        self.live.fetch_add(1, Ordering::SeqCst);
        let mut handle = ChromeHandle {
            port,
            pid,
            child: Some(child),
            user_data_dir,
            live: self.live.clone(),
        };

        // 浏览器在就绪前退出时不再继续等待
        let ready = tokio::select! {
            result = connection::wait_until_ready(port, self.startup_timeout) => result,
            status = handle.exited() => Err(AuditError::launch_failure(format!(
                "浏览器进程在就绪前退出 (端口: {}): {}",
                port, status
            ))),
        };

        match ready {
            Ok(product) => {
                info!("🚀 浏览器已启动: {} | 端口: {} | pid: {:?}", product, port, pid);
                Ok(handle)
            }
            Err(e) => {
                if let Err(kill_err) = handle.kill().await {
                    warn!("清理未就绪的浏览器失败: {}", kill_err);
                }
                Err(e)
            }
        }
    }

    async fn kill_all(&self) -> AuditResult<usize> {
        let namespace_dir = self.namespace_dir.clone();
        tokio::task::spawn_blocking(move || process::kill_stray_instances(&namespace_dir))
            .await
            .map_err(|e| AuditError::launch_failure(format!("清理任务异常退出: {}", e)))?
            .map_err(|e| AuditError::launch_failure(format!("清理残留浏览器失败: {}", e)))
    }
}

/// 一个由 `ChromeLauncher` 启动的浏览器进程
///
/// 未调用 `kill` 就被丢弃时，进程仍会在 `Drop` 中被终止。
pub struct ChromeHandle {
    port: u16,
    pid: Option<u32>,
    child: Option<Child>,
    user_data_dir: PathBuf,
    live: Arc<AtomicUsize>,
}

impl ChromeHandle {
    /// 等待浏览器进程退出，返回退出状态
    async fn exited(&mut self) -> String {
        match self.child.as_mut() {
            Some(child) => match child.wait().await {
                Ok(status) => status.to_string(),
                Err(e) => e.to_string(),
            },
            None => std::future::pending().await,
        }
    }
}

#[async_trait]
impl BrowserHandle for ChromeHandle {
    fn port(&self) -> u16 {
        self.port
    }

    async fn kill(&mut self) -> AuditResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        self.live.fetch_sub(1, Ordering::SeqCst);

        let result = match child.try_wait() {
            Ok(Some(status)) => {
                debug!("浏览器进程已自行退出 (端口: {}): {}", self.port, status);
                Ok(())
            }
            _ => child.kill().await,
        };
        remove_user_data_dir(&self.user_data_dir).await;
        debug!("浏览器已终止 (端口: {}, pid: {:?})", self.port, self.pid);

        result.map_err(|e| AuditError::TerminationFailure {
            port: self.port,
            reason: e.to_string(),
        })
    }
}

impl Drop for ChromeHandle {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            self.live.fetch_sub(1, Ordering::SeqCst);
            if let Err(e) = child.start_kill() {
                warn!("终止浏览器进程失败 (pid: {:?}): {}", self.pid, e);
            }
            let _ = std::fs::remove_dir_all(&self.user_data_dir);
        }
    }
}

/// 让系统分配一个空闲的本地端口
fn free_port() -> AuditResult<u16> {
    std::net::TcpListener::bind(("127.0.0.1", 0))
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .map_err(|e| AuditError::launch_failure(format!("无法分配空闲端口: {}", e)))
}

/// 删除用户数据目录
///
/// 浏览器退出后子进程可能还在写文件，失败时稍等重试几次。
async fn remove_user_data_dir(dir: &std::path::Path) {
    for attempt in 1..=3 {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => return,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) if attempt == 3 => {
                warn!("删除用户数据目录失败 {}: {}", dir.display(), e);
            }
            Err(_) => sleep(Duration::from_millis(200)).await,
        }
    }
}
