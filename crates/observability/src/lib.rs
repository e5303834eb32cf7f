//! # Observability
//!
//! 可观测性模块：日志订阅 + Prometheus 指标。
//!
//! ## 功能
//!
//! - 日志初始化 (JSON/Pretty/Compact)，统一写到 stderr，stdout 只留给命令输出
//! - `run` 期间的 Prometheus 导出端点
//! - 广播、登记、命令指标与运行统计
//!
//! ## 使用示例
//!
//! ```ignore
//! observability::init_logging(&LoggingConfig::default())?;
//!
//! let report = dispatcher.broadcast("hello").await?;
//! observability::record_broadcast("daily_10pm", &report);
//! ```

pub mod metrics;

use std::io;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use crate::metrics::{
    record_broadcast, record_broadcast_error, record_command, record_registration,
    record_registry_size, BroadcastStats, BroadcastSummary, RunningStats, StatsSummary,
};

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `RUST_LOG` 未设置时使用的过滤指令
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            default_directive: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// `-q` 优先于 `-v`；`-v` debug，`-vv` 及以上 trace
    pub fn from_verbosity(format: LogFormat, quiet: bool, verbose: u8) -> Self {
        let directive = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            format,
            default_directive: directive.to_string(),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.default_directive))
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 每行一个 JSON 对象
    Json,
    #[default]
    Pretty,
    Compact,
}

/// 安装全局日志订阅者
///
/// 只能成功一次；重复调用返回错误。
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let subscriber = tracing_subscriber::registry().with(config.filter());

    let installed = match config.format {
        LogFormat::Json => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(fmt::layer().pretty().with_writer(io::stderr))
            .try_init(),
        LogFormat::Compact => subscriber
            .with(fmt::layer().compact().with_writer(io::stderr).with_target(false))
            .try_init(),
    };
    installed.context("Failed to initialize tracing subscriber")?;

    tracing::debug!(format = ?config.format, "Logging initialized");
    Ok(())
}

/// 在 `0.0.0.0:port` 上启动 Prometheus 抓取端点
///
/// 需要在 tokio 运行时中调用，进程内只能安装一次。
pub fn serve_metrics(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port, "Prometheus metrics endpoint listening");
    Ok(())
}
