//! Scheduler 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Scheduler 错误
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// 时区偏移无法解析
    #[error("invalid schedule zone: {0}")]
    InvalidZone(#[from] ContractError),

    /// 触发器永远不会触发
    #[error("job '{job_id}' has no fire time: {trigger}")]
    InvalidTrigger {
        /// Job ID
        job_id: String,
        /// 触发器描述
        trigger: String,
    },
}
