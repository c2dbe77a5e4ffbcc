use std::time::Duration;

use chromiumoxide::Browser;
use futures::StreamExt;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

use crate::error::{AuditError, AuditResult};

/// 每次探测之间的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);
/// 单次连接尝试的超时
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// 等待指定端口上的浏览器调试接口就绪
///
/// 通过 CDP 连接浏览器并查询版本号，成功后立即断开连接（不会关闭浏览器）。
///
/// # 返回
/// 返回浏览器的产品名称，例如 `HeadlessChrome/126.0.6478.126`
pub async fn wait_until_ready(port: u16, startup_timeout: Duration) -> AuditResult<String> {
    let browser_url = format!("http://127.0.0.1:{}", port);
    let deadline = Instant::now() + startup_timeout;
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        match timeout(CONNECT_TIMEOUT, probe(&browser_url)).await {
            Ok(Ok(product)) => {
                debug!("浏览器调试接口就绪 (端口: {}, 尝试 {} 次)", port, attempts);
                return Ok(product);
            }
            Ok(Err(e)) => debug!("连接浏览器失败 (第 {} 次): {}", attempts, e),
            Err(_) => debug!("连接浏览器超时 (第 {} 次)", attempts),
        }

        if Instant::now() >= deadline {
            return Err(AuditError::launch_failure(format!(
                "浏览器调试接口在 {} ms 内未就绪 (端口: {})",
                startup_timeout.as_millis(),
                port
            )));
        }
        sleep(POLL_INTERVAL).await;
    }
}

async fn probe(browser_url: &str) -> Result<String, chromiumoxide::error::CdpError> {
    let (browser, mut handler) = Browser::connect(browser_url).await?;

    // 在后台处理浏览器事件
    let events = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    let version = browser.version().await;
    drop(browser);
    events.abort();

    let version = version?;
    debug!("浏览器版本: {}", version.product);
    Ok(version.product)
}
