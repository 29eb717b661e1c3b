use anyhow::Result;
use clap::Parser;
use integrity_audit::app::{App, CliArgs};
use integrity_audit::config::Config;
use integrity_audit::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行，`--help` / `--version` 在此直接退出
    let args = CliArgs::parse();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).run(&args).await?;

    Ok(())
}
