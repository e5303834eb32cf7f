//! # Dispatcher
//!
//! 广播分发模块。
//!
//! 负责：
//! - 读取 registry 快照
//! - Fan-out 到每个已登记的 chat
//! - 隔离单个目标的发送失败，不中断整批
//! - 通过队列接收调度任务，在同一 tokio 运行时中执行

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod transports;

pub use contracts::{DeliveryOutcome, DeliveryReport, Transport};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::{BroadcastJob, BroadcastQueue, DispatcherHandle};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use transports::{AnyTransport, LogTransport, TelegramConfig, TelegramTransport};
