//! # Commands
//!
//! 命令处理模块。
//!
//! 负责：
//! - 每个入站事件先登记 chat 到 registry
//! - /start /help /contact /ask 与管理员名单命令的回复
//! - /ask 调用 `Assistant` 并写入问答日志
//!
//! 平台原始更新的解析不在这里；调用方传入已路由的 `InboundEvent`。

mod ask_log;
mod assistant;
mod error;
mod event;
mod reply;
mod surface;

pub use ask_log::{AskLog, AskRecord};
pub use assistant::{Assistant, AssistantError, LocalAssistant, OfflineAssistant};
pub use error::CommandError;
pub use event::{ChatInfo, Command, InboundEvent, SenderInfo};
pub use reply::Reply;
pub use surface::{CommandSurface, SurfaceConfig};
