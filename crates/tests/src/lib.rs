//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 示例配置加载测试
//! - 命令入口 -> registry -> 广播分发的端到端测试
//! - 调度器驱动的广播测试（暂停的 tokio 时钟）
//! - Telegram 传输的 HTTP 契约测试（wiremock）

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{TransportKind, Trigger};

    const SAMPLE_CONFIG: &str = include_str!("../../../chat-relay.toml");

    #[test]
    fn test_sample_config_needs_only_a_token() {
        // Telegram transport without a token in the file
        assert!(ConfigLoader::load_from_str(SAMPLE_CONFIG, ConfigFormat::Toml).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat-relay.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();

        let mut blueprint = ConfigLoader::parse_from_path(&path).unwrap();
        assert_eq!(blueprint.transport.kind, TransportKind::Telegram);
        assert_eq!(blueprint.schedule.offset().unwrap().local_minus_utc(), 19_800);
        assert_eq!(
            blueprint
                .schedule
                .jobs
                .iter()
                .map(|job| (job.id.as_str(), job.trigger))
                .collect::<Vec<_>>(),
            vec![
                ("test_message", Trigger::AfterStartup { minutes: 1 }),
                ("daily_10pm", Trigger::Daily { hour: 22, minute: 0 }),
            ]
        );

        blueprint.transport.token = Some("123:abc".to_string());
        assert!(ConfigLoader::validate(&blueprint).is_ok());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use commands::{
        ChatInfo, Command, CommandSurface, InboundEvent, OfflineAssistant, Reply, SenderInfo,
        SurfaceConfig,
    };
    use contracts::{
        ChatId, DeliveryError, DeliveryOutcome, JobConfig, RelayBlueprint, ScheduleConfig,
        Transport, TransportKind, Trigger,
    };
    use dispatcher::{BroadcastJob, Dispatcher, DispatcherConfig, DispatcherHandle};
    use registry::Registry;
    use scheduler::{Clock, Scheduler};
    use tempfile::{tempdir, TempDir};

    /// Records deliveries; fails for the configured ids
    #[derive(Clone, Default)]
    struct RecordingTransport {
        failing: Arc<HashSet<String>>,
        sent: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingTransport {
        fn failing(ids: &[&str]) -> Self {
            Self {
                failing: Arc::new(ids.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            }
        }

        fn destinations(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(id, _)| id.clone())
                .collect()
        }
    }

    impl Transport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, destination: &ChatId, text: &str) -> Result<(), DeliveryError> {
            if self.failing.contains(destination.as_str()) {
                return Err(DeliveryError::rejected(
                    destination.as_str(),
                    403,
                    "Forbidden: bot was kicked",
                ));
            }
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn open_registry() -> (TempDir, Arc<Registry>) {
        let dir = tempdir().unwrap();
        let registry = Registry::open(dir.path().join("chat_ids.txt")).unwrap();
        (dir, Arc::new(registry))
    }

    fn surface(registry: &Arc<Registry>, admin: &str) -> CommandSurface<OfflineAssistant> {
        let config = SurfaceConfig {
            admin_ids: HashSet::from([admin.to_string()]),
            contact: "📞 Contact us".to_string(),
            ask_log_path: None,
        };
        CommandSurface::new(Arc::clone(registry), OfflineAssistant, config)
    }

    fn event(chat_id: &str, title: &str, command: Command) -> InboundEvent {
        InboundEvent::new(
            ChatInfo::new(chat_id).with_title(title),
            SenderInfo::new(chat_id),
            command,
        )
    }

    /// Chats that talk to the bot are broadcast to, in first-seen order
    #[tokio::test]
    async fn test_seen_chats_receive_broadcast() {
        let (_dir, registry) = open_registry();
        let surface = surface(&registry, "1");

        surface
            .handle(&event("-100", "Team", Command::Start))
            .await
            .unwrap();
        surface
            .handle(&event("7", "Alice", Command::Text("hi".to_string())))
            .await
            .unwrap();
        surface
            .handle(&event("@news", "News", Command::Help))
            .await
            .unwrap();
        // Seen again under a new name: still one entry
        surface
            .handle(&event("-100", "Team (renamed)", Command::Contact))
            .await
            .unwrap();
        assert_eq!(registry.len(), 3);

        let transport = RecordingTransport::default();
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            transport.clone(),
            DispatcherConfig::default(),
        );
        let report = dispatcher.broadcast("🌙 Good evening!").await.unwrap();

        assert_eq!(report.delivered(), 3);
        assert_eq!(transport.destinations(), vec!["-100", "7", "@news"]);
        assert_eq!(report.records()[0].entry.display_name, "Team");
    }

    /// One failing chat does not stop the others
    #[tokio::test]
    async fn test_failures_are_isolated() {
        let (_dir, registry) = open_registry();
        for id in ["1", "2", "3"] {
            registry.register(id, Some("chat")).unwrap();
        }

        let transport = RecordingTransport::failing(&["2"]);
        let handle = DispatcherHandle::spawn(
            Dispatcher::new(
                Arc::clone(&registry),
                transport.clone(),
                DispatcherConfig::default(),
            ),
            4,
        );

        handle
            .queue()
            .enqueue(BroadcastJob::new("manual", "hello"))
            .await
            .unwrap();
        let metrics = Arc::clone(handle.metrics());
        handle.shutdown().await;

        assert_eq!(transport.destinations(), vec!["1", "3"]);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.jobs_run, 1);
        assert_eq!(snapshot.deliveries_ok, 2);
        assert_eq!(snapshot.deliveries_failed, 1);
    }

    /// Registrations survive a restart
    #[tokio::test]
    async fn test_registry_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_ids.txt");

        {
            let registry = Arc::new(Registry::open(&path).unwrap());
            let surface = surface(&registry, "1");
            surface
                .handle(&event("42", "Bob", Command::Start))
                .await
                .unwrap();
        }

        let registry = Arc::new(Registry::open(&path).unwrap());
        assert!(registry.contains("42"));

        let replies = surface(&registry, "1")
            .handle(&InboundEvent::new(
                ChatInfo::new("1"),
                SenderInfo::new("1"),
                Command::ListChats,
            ))
            .await
            .unwrap();
        let [Reply::Markdown { text }] = replies.as_slice() else {
            panic!("expected one markdown roster, got {replies:?}");
        };
        assert!(text.contains("*Bob*"));
        assert!(text.contains("`42`"));
    }

    /// Wall clock driven by tokio's (pausable) clock
    #[derive(Clone, Copy)]
    struct PausedClock {
        base: DateTime<Utc>,
        origin: tokio::time::Instant,
    }

    impl Clock for PausedClock {
        fn now(&self) -> DateTime<Utc> {
            self.base + chrono::Duration::from_std(self.origin.elapsed()).unwrap()
        }
    }

    /// Scheduler -> queue -> worker -> every chat the surface registered
    #[tokio::test(start_paused = true)]
    async fn test_scheduled_broadcast_reaches_registered_chats() {
        let (_dir, registry) = open_registry();
        let surface = surface(&registry, "1");
        for (id, title) in [("10", "Ten"), ("20", "Twenty")] {
            surface
                .handle(&event(id, title, Command::Start))
                .await
                .unwrap();
        }

        let transport = RecordingTransport::default();
        let handle = DispatcherHandle::spawn(
            Dispatcher::new(
                Arc::clone(&registry),
                transport.clone(),
                DispatcherConfig::default(),
            ),
            8,
        );

        // 21:58 in +05:30
        let clock = PausedClock {
            base: DateTime::parse_from_rfc3339("2024-06-01T21:58:00+05:30")
                .unwrap()
                .with_timezone(&Utc),
            origin: tokio::time::Instant::now(),
        };
        let schedule = ScheduleConfig {
            utc_offset: "+05:30".to_string(),
            jobs: vec![JobConfig {
                id: "daily_10pm".to_string(),
                message: "🌙 Good evening!".to_string(),
                trigger: Trigger::Daily { hour: 22, minute: 0 },
            }],
        };
        let scheduler =
            Scheduler::start_with_clock(&schedule, handle.queue(), clock.now(), clock).unwrap();

        tokio::time::sleep(Duration::from_secs(3 * 60)).await;
        scheduler.shutdown().await;
        handle.shutdown().await;

        assert_eq!(
            transport.sent.lock().unwrap().clone(),
            vec![
                ("10".to_string(), "🌙 Good evening!".to_string()),
                ("20".to_string(), "🌙 Good evening!".to_string()),
            ]
        );
    }

    /// Telegram transport built from the blueprint, against a mock Bot API
    #[tokio::test]
    async fn test_blueprint_telegram_broadcast() {
        use serde_json::json;
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(json!({"chat_id": 42})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(json!({"chat_id": -1001})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, registry) = open_registry();
        registry.register("42", Some("Alice")).unwrap();
        registry.register("-1001", Some("Gone group")).unwrap();
        registry.register("not a chat", None).unwrap();

        let mut blueprint = RelayBlueprint::default();
        blueprint.transport.kind = TransportKind::Telegram;
        blueprint.transport.api_base = server.uri();
        blueprint.transport.token = Some("123:abc".to_string());
        config_loader::ConfigLoader::validate(&blueprint).unwrap();

        let dispatcher = dispatcher::create_dispatcher(Arc::clone(&registry), &blueprint).unwrap();
        let report = dispatcher.broadcast("hello").await.unwrap();

        assert_eq!(report.delivered(), 1);
        let failed: Vec<_> = report
            .records()
            .iter()
            .filter_map(|r| match &r.outcome {
                DeliveryOutcome::Failed { error } => Some((r.entry.id.to_string(), error.kind())),
                DeliveryOutcome::Delivered => None,
            })
            .collect();
        assert_eq!(
            failed,
            vec![
                ("-1001".to_string(), "rejected"),
                ("not a chat".to_string(), "invalid_destination"),
            ]
        );
    }
}
