//! RelayBlueprint - Config Loader output
//!
//! Describes the whole relay: where the registry lives, how messages leave,
//! when broadcasts fire and who may run admin commands.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use validator::Validate;

use crate::ContractError;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration
///
/// Every section has defaults, so an empty document is a valid blueprint
/// that logs broadcasts instead of sending them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RelayBlueprint {
    #[serde(default)]
    pub version: ConfigVersion,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    #[validate(nested)]
    pub transport: TransportConfig,

    #[serde(default)]
    #[validate(nested)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    #[validate(nested)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Flat-file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Registry file, `id|display_name` per line
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// `/ask` transcript file (None = not recorded)
    #[serde(default = "default_ask_log_path")]
    pub ask_log_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            ask_log_path: default_ask_log_path(),
        }
    }
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("chat_ids.txt")
}

fn default_ask_log_path() -> Option<PathBuf> {
    Some(PathBuf::from("ask_log.txt"))
}

/// Delivery backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Log each delivery, send nothing
    #[default]
    Log,
    /// Telegram Bot API
    Telegram,
}

/// Transport configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct TransportConfig {
    #[serde(default)]
    pub kind: TransportKind,

    /// Bot API base URL
    #[serde(default = "default_api_base")]
    #[validate(length(min = 1))]
    pub api_base: String,

    /// Bot token; usually supplied through `BOT_TOKEN`
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            api_base: default_api_base(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Keep the token out of logs.
impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("kind", &self.kind)
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Dispatcher tuning
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchConfig {
    /// Pending broadcast jobs before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, max = 1024))]
    pub queue_capacity: usize,

    /// Concurrent sends within one broadcast (1 = sequential)
    #[serde(default = "default_max_in_flight")]
    #[validate(range(min = 1, max = 64))]
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

fn default_queue_capacity() -> usize {
    8
}

fn default_max_in_flight() -> usize {
    1
}

/// Broadcast schedule
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleConfig {
    /// Zone the wall-clock triggers are evaluated in, e.g. `"+05:30"`
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    #[serde(default = "default_jobs")]
    #[validate(nested)]
    pub jobs: Vec<JobConfig>,
}

impl ScheduleConfig {
    /// Parsed zone offset
    pub fn offset(&self) -> Result<FixedOffset, ContractError> {
        parse_utc_offset(&self.utc_offset).ok_or_else(|| {
            ContractError::config_validation(
                "schedule.utc_offset",
                format!(
                    "expected '+HH:MM', '-HH:MM' or 'UTC', got '{}'",
                    self.utc_offset
                ),
            )
        })
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
            jobs: default_jobs(),
        }
    }
}

fn default_utc_offset() -> String {
    "+05:30".to_string()
}

fn default_jobs() -> Vec<JobConfig> {
    vec![
        JobConfig {
            id: "test_message".to_string(),
            message: "🚀 Test message sent 1 min after startup".to_string(),
            trigger: Trigger::AfterStartup { minutes: 1 },
        },
        JobConfig {
            id: "daily_10pm".to_string(),
            message: "🌙 Good evening! This is your 10 PM message.".to_string(),
            trigger: Trigger::Daily { hour: 22, minute: 0 },
        },
    ]
}

/// One scheduled broadcast
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JobConfig {
    /// Unique job name, used as log/metric label
    #[validate(length(min = 1))]
    pub id: String,

    /// Text broadcast to every registered chat
    #[validate(length(min = 1))]
    pub message: String,

    pub trigger: Trigger,
}

/// When a job fires. Both variants recur daily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// First at `startup + minutes`, then daily at that wall-clock time
    AfterStartup { minutes: u32 },
    /// Daily at `hour:minute`
    Daily { hour: u32, minute: u32 },
}

/// Admin commands and static replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// User ids allowed to run admin commands
    #[serde(default)]
    pub ids: Vec<String>,

    /// Reply to `/contact`
    #[serde(default = "default_contact")]
    pub contact: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            contact: default_contact(),
        }
    }
}

fn default_contact() -> String {
    "📞 Contact us at: @Mr_Wizard_1".to_string()
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM` or `UTC`/`Z`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("utc") || value == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
