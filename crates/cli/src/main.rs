//! # Chat Relay CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 调度器与分发 worker 的生命周期管理
//! - 手动登记、广播与命令调试
//! - 优雅关闭处理

mod cli;
mod commands;
mod relay;

use anyhow::Result;
use clap::Parser;
use observability::LoggingConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_broadcast, run_command, run_list, run_register, run_relay, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Metrics exporter is started by `run` only
    observability::init_logging(&LoggingConfig::from_verbosity(
        cli.log_format.into(),
        cli.quiet,
        cli.verbose,
    ))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Chat Relay CLI starting");

    let result = match &cli.command {
        Commands::Run(args) => run_relay(args).await,
        Commands::Broadcast(args) => run_broadcast(args).await,
        Commands::List(args) => run_list(args),
        Commands::Register(args) => run_register(args),
        Commands::Command(args) => run_command(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
