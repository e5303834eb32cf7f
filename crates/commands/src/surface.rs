//! CommandSurface - registers every chat it hears from and answers commands

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use contracts::RelayBlueprint;
use registry::Registry;
use tracing::{debug, error, info, instrument, warn};

use crate::ask_log::{AskLog, AskRecord};
use crate::assistant::Assistant;
use crate::error::CommandError;
use crate::event::{Command, InboundEvent};
use crate::reply::Reply;

const GREETING: &str = "👋 Hello Dear! I am Alive.";
const HELP_PROMPT: &str = "🤖 Tell me how can I help you?";
const KEYBOARD_PROMPT: &str = "👇 Choose an option:";
const KEYBOARD: &[&[&str]] = &[&["Start", "Help"], &["Contact", "About"]];
const HELP_TEXT: &str = "📋 Command List:\n/start - Start the bot\n/help - Get help\n/contact - Contact info\n/ask - Talk to AI";
const ADMIN_ONLY: &str = "❌ This command is for bot admins only.";
const ROSTER_HEADER: &str = "📋 *All Users/Groups/Channels:*\n\n";
const ROSTER_EMPTY: &str = "📋 No users found in the database.";
const ASK_USAGE: &str = "💬 Please type your question like:\n`/ask What can you do?`";
const ASK_FALLBACK: &str = "❌ AI failed to respond. Please check API key or try again later.";

/// Command surface settings
#[derive(Debug, Clone, Default)]
pub struct SurfaceConfig {
    /// Sender ids allowed to run admin commands
    pub admin_ids: HashSet<String>,
    /// `/contact` reply
    pub contact: String,
    /// `/ask` transcript (None = not recorded)
    pub ask_log_path: Option<PathBuf>,
}

impl From<&RelayBlueprint> for SurfaceConfig {
    fn from(blueprint: &RelayBlueprint) -> Self {
        Self {
            admin_ids: blueprint
                .admin
                .ids
                .iter()
                .map(|id| id.trim().to_string())
                .collect(),
            contact: blueprint.admin.contact.clone(),
            ask_log_path: blueprint.store.ask_log_path.clone(),
        }
    }
}

/// Handles inbound events against a shared registry
pub struct CommandSurface<A> {
    registry: Arc<Registry>,
    assistant: A,
    admin_ids: HashSet<String>,
    contact: String,
    ask_log: Option<AskLog>,
}

impl<A: Assistant + Sync> CommandSurface<A> {
    pub fn new(registry: Arc<Registry>, assistant: A, config: SurfaceConfig) -> Self {
        Self {
            registry,
            assistant,
            admin_ids: config.admin_ids,
            contact: config.contact,
            ask_log: config.ask_log_path.map(AskLog::new),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn is_admin(&self, sender_id: &str) -> bool {
        self.admin_ids.contains(sender_id.trim())
    }

    /// Register the event's chat, then answer its command
    ///
    /// Plain text is registered but gets no reply.
    ///
    /// # Errors
    /// `Registry` when the chat cannot be recorded or, for the roster, read.
    #[instrument(
        name = "command_handle",
        skip_all,
        fields(chat_id = %event.chat.id, command = event.command.name())
    )]
    pub async fn handle(&self, event: &InboundEvent) -> Result<Vec<Reply>, CommandError> {
        self.register_chat(event)?;
        observability::record_command(event.command.name());

        let replies = match &event.command {
            Command::Start => vec![
                Reply::text(GREETING),
                Reply::text(HELP_PROMPT),
                Reply::keyboard(KEYBOARD_PROMPT, KEYBOARD),
            ],
            Command::Help => vec![Reply::text(HELP_TEXT)],
            Command::Contact => vec![Reply::text(self.contact.as_str())],
            Command::ListChats => vec![self.list_chats(event)?],
            Command::Ask(question) => vec![self.ask(event, question).await],
            Command::Text(_) => Vec::new(),
        };

        debug!(replies = replies.len(), "Command handled");
        Ok(replies)
    }

    fn register_chat(&self, event: &InboundEvent) -> Result<(), CommandError> {
        let name = event.chat_display_name();
        match self.registry.register(event.chat.id.as_str(), Some(name)) {
            Ok(outcome) => {
                observability::record_registration(outcome.as_str());
                if outcome.is_new() {
                    observability::record_registry_size(self.registry.len());
                    info!(chat_id = %event.chat.id, name = %name, "New chat registered");
                }
                Ok(())
            }
            Err(e) => {
                observability::record_registration("failed");
                error!(chat_id = %event.chat.id, error = %e, "Chat registration failed");
                Err(e.into())
            }
        }
    }

    fn list_chats(&self, event: &InboundEvent) -> Result<Reply, CommandError> {
        if !self.is_admin(&event.sender.id) {
            warn!(sender_id = %event.sender.id, "Admin command refused");
            return Ok(Reply::text(ADMIN_ONLY));
        }

        let entries = self.registry.load_all()?;
        if entries.is_empty() {
            return Ok(Reply::text(ROSTER_EMPTY));
        }

        let mut roster = String::from(ROSTER_HEADER);
        for (n, entry) in entries.iter().enumerate() {
            roster.push_str(&format!(
                "{}. *{}*\n   ID: `{}`\n\n",
                n + 1,
                entry.display_name,
                entry.id
            ));
        }
        Ok(Reply::markdown(roster))
    }

    async fn ask(&self, event: &InboundEvent, question: &str) -> Reply {
        let question = question.trim();
        if question.is_empty() {
            return Reply::markdown(ASK_USAGE);
        }

        let answer = match self.assistant.reply(question).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Assistant returned an empty reply");
                ASK_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Assistant failed");
                ASK_FALLBACK.to_string()
            }
        };

        if let Some(log) = &self.ask_log {
            let record = AskRecord {
                at: Local::now().naive_local(),
                chat_name: event.chat_display_name().to_string(),
                chat_id: event.chat.id.to_string(),
                user_name: event.sender.display_name().to_string(),
                user_id: event.sender.id.clone(),
                question: question.to_string(),
                reply: answer.clone(),
            };
            // The user still gets the answer
            if let Err(e) = log.append(&record) {
                error!(error = %e, "Failed to write ask log");
            }
        }

        Reply::text(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{AssistantError, OfflineAssistant};
    use crate::event::{ChatInfo, SenderInfo};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    /// Echoes the question back
    struct EchoAssistant;

    impl Assistant for EchoAssistant {
        async fn reply(&self, question: &str) -> Result<String, AssistantError> {
            Ok(format!("  You asked: {question}  "))
        }
    }

    fn surface<A: Assistant + Sync>(assistant: A, admins: &[&str]) -> (TempDir, CommandSurface<A>) {
        let dir = tempdir().unwrap();
        let registry = Arc::new(Registry::open(dir.path().join("chat_ids.txt")).unwrap());
        let config = SurfaceConfig {
            admin_ids: admins.iter().map(|s| s.to_string()).collect(),
            contact: "📞 Contact us at: @relay_admin".to_string(),
            ask_log_path: Some(dir.path().join("ask_log.txt")),
        };
        (dir, CommandSurface::new(registry, assistant, config))
    }

    fn event(chat_id: &str, sender_id: &str, command: Command) -> InboundEvent {
        let chat = ChatInfo {
            first_name: Some(format!("user{sender_id}")),
            ..ChatInfo::new(chat_id)
        };
        InboundEvent::new(chat, SenderInfo::new(sender_id), command)
    }

    #[tokio::test]
    async fn test_start_registers_and_greets() {
        let (_dir, surface) = surface(OfflineAssistant, &[]);

        let replies = surface.handle(&event("42", "42", Command::Start)).await.unwrap();

        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0], Reply::text("👋 Hello Dear! I am Alive."));
        assert_eq!(
            replies[2],
            Reply::Keyboard {
                text: "👇 Choose an option:".to_string(),
                buttons: vec![
                    vec!["Start".to_string(), "Help".to_string()],
                    vec!["Contact".to_string(), "About".to_string()],
                ],
            }
        );
        assert!(surface.registry().contains("42"));
    }

    #[tokio::test]
    async fn test_every_command_registers_once() {
        let (_dir, surface) = surface(OfflineAssistant, &[]);

        for command in [
            Command::Help,
            Command::Contact,
            Command::Text("hi".into()),
            Command::ListChats,
            Command::Ask(String::new()),
        ] {
            surface.handle(&event("-1001", "7", command)).await.unwrap();
        }

        let entries = surface.registry().load_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "user7");
    }

    #[tokio::test]
    async fn test_help_contact_and_text() {
        let (_dir, surface) = surface(OfflineAssistant, &[]);

        let help = surface.handle(&event("1", "1", Command::Help)).await.unwrap();
        assert!(help[0].body().starts_with("📋 Command List:\n/start - Start the bot"));

        let contact = surface.handle(&event("1", "1", Command::Contact)).await.unwrap();
        assert_eq!(contact, vec![Reply::text("📞 Contact us at: @relay_admin")]);

        let text = surface
            .handle(&event("1", "1", Command::Text("About".into())))
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_list_chats_requires_admin() {
        let (_dir, surface) = surface(OfflineAssistant, &["5239347550"]);

        let replies = surface
            .handle(&event("99", "99", Command::ListChats))
            .await
            .unwrap();

        assert_eq!(replies, vec![Reply::text("❌ This command is for bot admins only.")]);
    }

    #[tokio::test]
    async fn test_list_chats_roster() {
        let (_dir, surface) = surface(OfflineAssistant, &["5239347550"]);
        let group = InboundEvent::new(
            ChatInfo::new("-1001").with_title("Rust Club"),
            SenderInfo::new("7"),
            Command::Start,
        );
        surface.handle(&group).await.unwrap();

        let replies = surface
            .handle(&event("5239347550", "5239347550", Command::ListChats))
            .await
            .unwrap();

        assert_eq!(
            replies,
            vec![Reply::markdown(
                "📋 *All Users/Groups/Channels:*\n\n\
                 1. *Rust Club*\n   ID: `-1001`\n\n\
                 2. *user5239347550*\n   ID: `5239347550`\n\n"
            )]
        );
    }

    #[tokio::test]
    async fn test_empty_question_gets_usage() {
        let (dir, surface) = surface(EchoAssistant, &[]);

        let replies = surface
            .handle(&event("1", "1", Command::Ask("   ".into())))
            .await
            .unwrap();

        assert_eq!(
            replies,
            vec![Reply::markdown("💬 Please type your question like:\n`/ask What can you do?`")]
        );
        assert!(!dir.path().join("ask_log.txt").exists());
    }

    #[tokio::test]
    async fn test_ask_replies_and_logs() {
        let (dir, surface) = surface(EchoAssistant, &[]);

        let replies = surface
            .handle(&event("1", "1", Command::Ask("What can you do?".into())))
            .await
            .unwrap();

        assert_eq!(replies, vec![Reply::text("You asked: What can you do?")]);
        let log = fs::read_to_string(dir.path().join("ask_log.txt")).unwrap();
        assert!(log.contains("Chat: user1 (1)\n"));
        assert!(log.contains("User: Unknown (1)\n"));
        assert!(log.contains("Asked: What can you do?\n"));
        assert!(log.ends_with("AI Reply: You asked: What can you do?\n\n"));
    }

    #[tokio::test]
    async fn test_assistant_failure_uses_fallback() {
        let (dir, surface) = surface(OfflineAssistant, &[]);

        let replies = surface
            .handle(&event("1", "1", Command::Ask("hello?".into())))
            .await
            .unwrap();

        assert_eq!(
            replies,
            vec![Reply::text(
                "❌ AI failed to respond. Please check API key or try again later."
            )]
        );
        let log = fs::read_to_string(dir.path().join("ask_log.txt")).unwrap();
        assert!(log.contains("AI Reply: ❌ AI failed to respond."));
    }

    #[tokio::test]
    async fn test_registry_failure_surfaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_ids.txt");
        let registry = Arc::new(Registry::open(&path).unwrap());
        // A directory where the file should be: appends fail
        fs::create_dir(&path).unwrap();
        let surface = CommandSurface::new(registry, OfflineAssistant, SurfaceConfig::default());

        let err = surface
            .handle(&event("1", "1", Command::Help))
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Registry(_)));
    }

    #[test]
    fn test_config_from_blueprint() {
        let mut blueprint = RelayBlueprint::default();
        blueprint.admin.ids = vec![" 42 ".to_string()];

        let config = SurfaceConfig::from(&blueprint);
        assert!(config.admin_ids.contains("42"));
        assert_eq!(config.contact, "📞 Contact us at: @Mr_Wizard_1");
        assert_eq!(config.ask_log_path, Some(PathBuf::from("ask_log.txt")));
    }
}
