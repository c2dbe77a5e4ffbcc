use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AuditError, AuditResult};

/// PATH 中查找的浏览器可执行文件名
const CANDIDATE_NAMES: &[&str] = &[
    "google-chrome-stable",
    "google-chrome",
    "chromium",
    "chromium-browser",
    "chrome",
    "msedge",
];

/// 常见的安装位置
const WELL_KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// 查找浏览器可执行文件
///
/// 查找顺序：
/// 1. 显式配置的路径
/// 2. `$PATH` 中的常见名称（通过 `which`，跨平台）
/// 3. 常见的安装位置
pub fn resolve_chrome(explicit: Option<&Path>) -> AuditResult<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(AuditError::launch_failure(format!(
            "配置的浏览器路径不存在: {}",
            path.display()
        )));
    }

    for name in CANDIDATE_NAMES {
        if let Ok(path) = which::which(name) {
            debug!("在 PATH 中找到浏览器: {}", path.display());
            return Ok(path);
        }
    }

    WELL_KNOWN_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or_else(|| {
            AuditError::launch_failure("找不到 Chrome / Chromium，请通过 CHROME_PATH 指定")
        })
}
