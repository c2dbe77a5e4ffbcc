//! 浏览器层
//!
//! 负责无头浏览器进程的启动、就绪探测和终止。
//! 编排层只通过 `BrowserLauncher` / `BrowserHandle` 两个 trait 使用浏览器。

pub mod connection;
pub mod executable;
pub mod launcher;
pub mod process;

use async_trait::async_trait;

use crate::error::AuditResult;

pub use launcher::{ChromeHandle, ChromeLauncher};

/// 一个正在运行的浏览器进程
#[async_trait]
pub trait BrowserHandle: Send {
    /// 调试协议端口
    fn port(&self) -> u16;

    /// 终止浏览器进程，重复调用无副作用
    async fn kill(&mut self) -> AuditResult<()>;
}

/// 浏览器启动器
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Handle: BrowserHandle;

    /// 在空闲端口上启动一个新的无头浏览器
    async fn launch(&self) -> AuditResult<Self::Handle>;

    /// 清理之前残留的浏览器进程，返回被终止的进程数
    ///
    /// 只保证清理本启动器管理的进程，对同时运行的其他批次没有一致性保证。
    async fn kill_all(&self) -> AuditResult<usize>;
}
