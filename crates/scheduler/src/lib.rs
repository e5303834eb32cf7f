//! # Scheduler
//!
//! 定时广播模块。
//!
//! 负责：
//! - 计算每个 job 的下一次触发时间 (固定 UTC 偏移时区)
//! - 到点时把 `BroadcastJob` 放入 dispatcher 队列
//!
//! 触发计算是纯函数 (`next_fire`)，时钟通过 `Clock` 注入，便于测试。

mod clock;
mod error;
mod runner;
mod trigger;

pub use clock::{Clock, SystemClock};
pub use error::SchedulerError;
pub use runner::Scheduler;
pub use trigger::next_fire;

pub use contracts::{JobConfig, ScheduleConfig, Trigger};
