//! 配置校验模块
//!
//! 校验规则：
//! - 字段级规则 (validator derive)
//! - job id 唯一
//! - 触发时间合法 (hour < 24, minute < 60, 启动延迟 1 分钟到一天)
//! - utc_offset 可解析
//! - telegram 传输必须提供 token
//! - registry 路径与 admin id 非空

use std::collections::HashSet;

use contracts::{ContractError, RelayBlueprint, TransportKind, Trigger};
use validator::Validate;

/// Longest accepted startup delay
const MAX_STARTUP_DELAY_MINUTES: u32 = 24 * 60;

/// 校验 RelayBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_store(blueprint)?;
    validate_transport(blueprint)?;
    validate_job_ids(blueprint)?;
    validate_triggers(blueprint)?;
    blueprint.schedule.offset()?;
    validate_admin_ids(blueprint)?;
    Ok(())
}

/// 字段级规则
fn validate_fields(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

/// 校验存储路径
fn validate_store(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.store.registry_path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "store.registry_path",
            "registry path cannot be empty",
        ));
    }
    if let Some(path) = &blueprint.store.ask_log_path {
        if path.as_os_str().is_empty() {
            return Err(ContractError::config_validation(
                "store.ask_log_path",
                "ask log path cannot be empty; omit it to disable the log",
            ));
        }
    }
    Ok(())
}

/// 校验传输配置
fn validate_transport(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let transport = &blueprint.transport;
    if transport.kind != TransportKind::Telegram {
        return Ok(());
    }

    let has_token = transport
        .token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_token {
        return Err(ContractError::config_validation(
            "transport.token",
            "telegram transport requires a bot token (set BOT_TOKEN)",
        ));
    }

    if !transport.api_base.starts_with("http://") && !transport.api_base.starts_with("https://") {
        return Err(ContractError::config_validation(
            "transport.api_base",
            format!("expected an http(s) URL, got '{}'", transport.api_base),
        ));
    }
    Ok(())
}

/// 校验 job id 唯一性
fn validate_job_ids(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for job in &blueprint.schedule.jobs {
        if !seen.insert(job.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("schedule.jobs[id={}]", job.id),
                "duplicate job id",
            ));
        }
    }
    Ok(())
}

/// 校验触发时间
fn validate_triggers(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    for job in &blueprint.schedule.jobs {
        let field = format!("schedule.jobs[{}].trigger", job.id);
        match job.trigger {
            Trigger::AfterStartup { minutes }
                if minutes == 0 || minutes > MAX_STARTUP_DELAY_MINUTES =>
            {
                return Err(ContractError::config_validation(
                    field,
                    format!("minutes must be 1-{MAX_STARTUP_DELAY_MINUTES}, got {minutes}"),
                ));
            }
            Trigger::Daily { hour, .. } if hour > 23 => {
                return Err(ContractError::config_validation(
                    field,
                    format!("hour must be 0-23, got {hour}"),
                ));
            }
            Trigger::Daily { minute, .. } if minute > 59 => {
                return Err(ContractError::config_validation(
                    field,
                    format!("minute must be 0-59, got {minute}"),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// 校验 admin id
fn validate_admin_ids(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    for (idx, id) in blueprint.admin.ids.iter().enumerate() {
        if id.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("admin.ids[{idx}]"),
                "admin id cannot be empty",
            ));
        }
    }
    Ok(())
}
