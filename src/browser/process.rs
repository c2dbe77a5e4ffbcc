//! 浏览器进程记录
//!
//! 每个浏览器实例在命名空间目录下有一个独立的用户数据目录
//! `<namespace>/chrome-<port>/`，其中的 `chrome.pid` 记录进程号。
//! 上一次运行崩溃后残留的进程通过这些记录清理。

use std::fs;
use std::path::{Path, PathBuf};

use sysinfo::{Pid, ProcessesToUpdate, Signal, System};
use tracing::{debug, info, warn};

/// 实例目录名前缀
pub const INSTANCE_PREFIX: &str = "chrome-";
/// PID 文件名
pub const PID_FILE: &str = "chrome.pid";

/// 实例目录：`<namespace>/chrome-<port>`
pub fn instance_dir(namespace_dir: &Path, port: u16) -> PathBuf {
    namespace_dir.join(format!("{}{}", INSTANCE_PREFIX, port))
}

/// 写入 PID 文件
pub fn write_pid(instance_dir: &Path, pid: u32) -> std::io::Result<()> {
    fs::create_dir_all(instance_dir)?;
    fs::write(instance_dir.join(PID_FILE), pid.to_string())
}

/// 读取 PID 文件
pub fn read_pid(instance_dir: &Path) -> Option<u32> {
    fs::read_to_string(instance_dir.join(PID_FILE))
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// 进程是否存在且看起来是浏览器
///
/// PID 可能已被系统复用，所以还要检查进程名。
pub fn is_browser_alive(pid: u32) -> bool {
    let sysinfo_pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[sysinfo_pid]), true);

    sys.process(sysinfo_pid)
        .map(|p| looks_like_browser(&p.name().to_string_lossy()))
        .unwrap_or(false)
}

fn looks_like_browser(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("chrom") || name.contains("headless_shell") || name.contains("msedge")
}

/// 终止进程，先尝试 SIGTERM，不支持时强制结束
fn terminate(pid: u32) -> bool {
    let sysinfo_pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[sysinfo_pid]), true);

    match sys.process(sysinfo_pid) {
        Some(process) => {
            if process.kill_with(Signal::Term).unwrap_or(false) {
                true
            } else {
                process.kill()
            }
        }
        None => false,
    }
}

/// 清理命名空间目录下所有残留的浏览器实例
///
/// 重复调用是安全的：没有残留时返回 0。
pub fn kill_stray_instances(namespace_dir: &Path) -> std::io::Result<usize> {
    if !namespace_dir.exists() {
        return Ok(0);
    }

    let mut killed = 0;
    for entry in fs::read_dir(namespace_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_instance = path.is_dir()
            && entry
                .file_name()
                .to_string_lossy()
                .starts_with(INSTANCE_PREFIX);
        if !is_instance {
            continue;
        }

        if let Some(pid) = read_pid(&path) {
            if is_browser_alive(pid) && terminate(pid) {
                info!("🧹 已终止残留的浏览器进程 (pid: {})", pid);
                killed += 1;
            } else {
                debug!("残留记录对应的进程已不存在 (pid: {})", pid);
            }
        }

        if let Err(e) = fs::remove_dir_all(&path) {
            warn!("删除残留目录失败 {}: {}", path.display(), e);
        }
    }

    Ok(killed)
}
