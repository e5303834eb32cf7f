//! `command` command implementation.

use anyhow::{Context, Result};
use command_surface::{
    ChatInfo, Command, CommandSurface, InboundEvent, OfflineAssistant, Reply, SenderInfo,
    SurfaceConfig,
};

use super::{load_blueprint, open_registry};
use crate::cli::{CommandAction, CommandArgs};

/// Execute the `command` command
pub async fn run_command(args: &CommandArgs) -> Result<()> {
    let blueprint = load_blueprint(&args.config)?;
    let registry = open_registry(&blueprint)?;
    let surface = CommandSurface::new(
        registry,
        OfflineAssistant,
        SurfaceConfig::from(&blueprint),
    );

    let event = inbound_event(args);
    let replies = surface
        .handle(&event)
        .await
        .context("Failed to handle command")?;

    if args.json {
        let json = serde_json::to_string_pretty(&replies).context("Failed to serialize replies")?;
        println!("{}", json);
    } else {
        print_replies(&replies);
    }
    Ok(())
}

fn inbound_event(args: &CommandArgs) -> InboundEvent {
    let mut chat = ChatInfo::new(args.chat_id.as_str());
    chat.title = args.chat_title.clone();

    let mut sender = SenderInfo::new(args.user_id.as_deref().unwrap_or(args.chat_id.as_str()));
    sender.full_name = args.user_name.clone();

    let command = match &args.action {
        CommandAction::Start => Command::Start,
        CommandAction::Help => Command::Help,
        CommandAction::Contact => Command::Contact,
        CommandAction::ListChats => Command::ListChats,
        CommandAction::Ask { words } => Command::Ask(words.join(" ")),
        CommandAction::Text { words } => Command::Text(words.join(" ")),
    };

    InboundEvent::new(chat, sender, command)
}

fn print_replies(replies: &[Reply]) {
    if replies.is_empty() {
        println!("(no reply)");
        return;
    }

    for reply in replies {
        println!("{}", reply.body());
        if let Reply::Keyboard { buttons, .. } = reply {
            for row in buttons {
                println!("  [{}]", row.join("] ["));
            }
        }
        println!();
    }
}
