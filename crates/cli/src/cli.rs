//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Chat Relay - remembers every chat it hears from and broadcasts to all of them
#[derive(Parser, Debug)]
#[command(
    name = "chat-relay",
    author,
    version,
    about = "Chat registry with scheduled broadcasts",
    long_about = "Remembers every chat the bot hears from in a flat registry file and \n\
                  broadcasts scheduled or one-off messages to all of them.\n\n\
                  Every config section has defaults; without a config file the relay \n\
                  logs broadcasts instead of sending them."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CHAT_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "CHAT_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler and dispatcher until Ctrl+C
    Run(RunArgs),

    /// Broadcast one message to every registered chat now
    Broadcast(BroadcastArgs),

    /// List registered chats
    List(ListArgs),

    /// Register a chat by hand
    Register(RegisterArgs),

    /// Run one inbound command through the command surface
    #[command(disable_help_subcommand = true)]
    Command(CommandArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Configuration source shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "CHAT_RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the registry file from configuration
    #[arg(long, env = "CHAT_RELAY_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Override the transport kind from configuration
    #[arg(long, value_enum, env = "CHAT_RELAY_TRANSPORT")]
    pub transport: Option<TransportArg>,

    /// Bot token for the telegram transport
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Stop after this many seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0", env = "CHAT_RELAY_DURATION")]
    pub duration: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "CHAT_RELAY_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without starting
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `broadcast` command
#[derive(Args, Debug, Clone)]
pub struct BroadcastArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Message text
    #[arg(short, long)]
    pub message: String,

    /// Print the delivery report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `register` command
#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Chat id (numeric id or @channel handle)
    pub id: String,

    /// Display name
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the `command` command
#[derive(Args, Debug, Clone)]
pub struct CommandArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Chat the command arrives from
    #[arg(long, allow_hyphen_values = true)]
    pub chat_id: String,

    /// Chat title (group/channel) or first name (private chat)
    #[arg(long)]
    pub chat_title: Option<String>,

    /// Sender id; defaults to the chat id
    #[arg(long, allow_hyphen_values = true)]
    pub user_id: Option<String>,

    /// Sender full name
    #[arg(long)]
    pub user_name: Option<String>,

    /// Output replies as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub action: CommandAction,
}

/// Inbound command to simulate
#[derive(Subcommand, Debug, Clone)]
pub enum CommandAction {
    /// /start
    Start,
    /// /help
    Help,
    /// /contact
    Contact,
    /// /list_chats (admin only)
    ListChats,
    /// /ask <question>
    Ask {
        #[arg(trailing_var_arg = true)]
        words: Vec<String>,
    },
    /// Plain text message
    Text {
        #[arg(trailing_var_arg = true, required = true)]
        words: Vec<String>,
    },
}

/// Arguments for the `validate` command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Transport override
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportArg {
    /// Log deliveries, send nothing
    Log,
    /// Telegram Bot API
    Telegram,
}

impl From<TransportArg> for contracts::TransportKind {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Log => Self::Log,
            TransportArg::Telegram => Self::Telegram,
        }
    }
}
