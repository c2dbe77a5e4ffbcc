use anyhow::{Context, Result};
use clap::Parser;
use lighthouse_batch::cli::Cli;
use lighthouse_batch::utils::logging;
use lighthouse_batch::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(&cli).context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let _summary = App::initialize(config).await?.run().await?;

    Ok(())
}
