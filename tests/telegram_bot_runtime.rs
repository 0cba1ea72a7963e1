use backupbot::bot::{BotRuntime, Frontend, JobLauncher};
use backupbot::channels::telegram::{
    resolve_token, TelegramApiClient, TelegramError, API_BASE_ENV, TOKEN_ENV,
};
use backupbot::config::{BackupConfig, GlobalConfig, Task, TelegramConfig};
use backupbot::notify::{NotificationSink, TelegramNotifier};
use backupbot::pipeline::{Pipeline, PipelineTools};
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const OPERATOR: i64 = 42;
const INTRUDER: i64 = 7;

#[derive(Debug, Clone)]
struct RecordedRequest {
    path: String,
    body: String,
}

impl RecordedRequest {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body json")
    }
}

struct MockTelegramServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockTelegramServer {
    fn start<F>(expected_requests: usize, responder: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_for_thread = Arc::clone(&requests);

        let handle = thread::spawn(move || {
            for _ in 0..expected_requests {
                let (mut stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

                let mut request_line = String::new();
                reader
                    .read_line(&mut request_line)
                    .expect("read request line");
                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();

                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("read header");
                    if line == "\r\n" || line.is_empty() {
                        break;
                    }
                    if line.to_ascii_lowercase().starts_with("content-length:") {
                        content_length = line
                            .split_once(':')
                            .map(|(_, v)| v.trim().parse::<usize>().unwrap_or(0))
                            .unwrap_or(0);
                    }
                }

                let mut body = vec![0_u8; content_length];
                if content_length > 0 {
                    reader.read_exact(&mut body).expect("read body");
                }
                requests_for_thread
                    .lock()
                    .expect("lock requests")
                    .push(RecordedRequest {
                        path: path.clone(),
                        body: String::from_utf8_lossy(&body).to_string(),
                    });

                let response_body = responder(&path);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response_body.len(),
                    response_body
                );
                stream
                    .write_all(response.as_bytes())
                    .expect("write response");
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle: Some(handle),
        }
    }

    fn finish(mut self) -> Vec<RecordedRequest> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("join mock server");
        }
        self.requests.lock().expect("lock requests").clone()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().expect("lock").push(message.to_string());
    }
}

fn config_with_missing_source(root: PathBuf) -> BackupConfig {
    BackupConfig {
        globals: GlobalConfig {
            rclone_remote_name: "s3".to_string(),
            remote_base_path: "backups".to_string(),
            ..GlobalConfig::default()
        },
        tasks: vec![Task {
            name: "docs".to_string(),
            source: root.join("absent"),
            archive_prefix: "docs".to_string(),
            retention_days: Some(7),
            schedule: None,
        }],
        ..BackupConfig::default()
    }
}

#[test]
fn notifier_posts_markdown_message_to_configured_chat() {
    let _env_guard = ENV_LOCK.lock().expect("env lock");
    let server = MockTelegramServer::start(1, |_| r#"{"ok":true,"result":{}}"#.to_string());
    std::env::set_var(API_BASE_ENV, &server.base_url);

    let notifier = TelegramNotifier::new(TelegramApiClient::new("123:abc".to_string()), OPERATOR);
    notifier.notify("✅ *Backup succeeded*");

    let requests = server.finish();
    std::env::remove_var(API_BASE_ENV);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/bot123:abc/sendMessage");
    let body = requests[0].json();
    assert_eq!(body["chat_id"], OPERATOR);
    assert_eq!(body["parse_mode"], "Markdown");
    assert_eq!(body["text"], "✅ *Backup succeeded*");
    assert!(body.get("reply_markup").is_none());
}

#[test]
fn notifier_swallows_api_rejections() {
    let _env_guard = ENV_LOCK.lock().expect("env lock");
    let server = MockTelegramServer::start(1, |_| {
        r#"{"ok":false,"description":"Bad Request: chat not found"}"#.to_string()
    });
    std::env::set_var(API_BASE_ENV, &server.base_url);

    let notifier = TelegramNotifier::new(TelegramApiClient::new("t".to_string()), OPERATOR);
    notifier.notify("hello");

    assert_eq!(server.finish().len(), 1);
    std::env::remove_var(API_BASE_ENV);
}

#[test]
fn get_updates_surfaces_api_errors() {
    let _env_guard = ENV_LOCK.lock().expect("env lock");
    let server = MockTelegramServer::start(1, |_| {
        r#"{"ok":false,"description":"Unauthorized"}"#.to_string()
    });
    std::env::set_var(API_BASE_ENV, &server.base_url);

    let api = TelegramApiClient::new("t".to_string());
    let err = api
        .get_updates(Some(5), Duration::from_secs(0))
        .expect_err("api error");

    let requests = server.finish();
    std::env::remove_var(API_BASE_ENV);
    assert!(matches!(err, TelegramError::ApiResponse(ref msg) if msg == "Unauthorized"));
    assert!(requests[0].path.starts_with("/bott/getUpdates?timeout=0"));
    assert!(requests[0].path.contains("offset=5"));
}

#[test]
fn env_token_overrides_config_token() {
    let _env_guard = ENV_LOCK.lock().expect("env lock");
    let config = TelegramConfig {
        token: Some("from-file".to_string()),
        chat_id: Some(OPERATOR),
    };

    std::env::remove_var(TOKEN_ENV);
    assert_eq!(resolve_token(&config).as_deref(), Some("from-file"));

    std::env::set_var(TOKEN_ENV, "from-env");
    assert_eq!(resolve_token(&config).as_deref(), Some("from-env"));

    std::env::set_var(TOKEN_ENV, "  ");
    assert_eq!(resolve_token(&config).as_deref(), Some("from-file"));
    std::env::remove_var(TOKEN_ENV);

    let empty = TelegramConfig::default();
    assert_eq!(resolve_token(&empty), None);
}

#[test]
fn poll_once_routes_updates_and_launches_only_authorized_jobs() {
    let _env_guard = ENV_LOCK.lock().expect("env lock");
    let updates = serde_json::json!({
        "ok": true,
        "result": [
            {"update_id": 10, "message": {"message_id": 1, "from": {"id": OPERATOR}, "chat": {"id": OPERATOR}, "text": "/start"}},
            {"update_id": 11, "callback_query": {"id": "cb-ok", "from": {"id": OPERATOR}, "message": {"message_id": 5, "chat": {"id": OPERATOR}}, "data": "confirm_backup:docs"}},
            {"update_id": 12, "message": {"message_id": 2, "from": {"id": INTRUDER}, "chat": {"id": INTRUDER}, "text": "/start"}},
            {"update_id": 13, "callback_query": {"id": "cb-bad", "from": {"id": INTRUDER}, "message": {"message_id": 6, "chat": {"id": INTRUDER}}, "data": "confirm_backup:docs"}}
        ]
    })
    .to_string();
    let server = MockTelegramServer::start(6, move |path| {
        if path.contains("/getUpdates") {
            updates.clone()
        } else {
            r#"{"ok":true,"result":true}"#.to_string()
        }
    });
    std::env::set_var(API_BASE_ENV, &server.base_url);

    let dir = tempdir().expect("tempdir");
    let config = Arc::new(config_with_missing_source(dir.path().to_path_buf()));
    let notifier = Arc::new(RecordingNotifier::default());
    let sink: Arc<dyn NotificationSink> = notifier.clone();
    let tools = PipelineTools {
        temp_dir: dir.path().to_path_buf(),
        ..PipelineTools::default()
    };
    let launcher = JobLauncher::new(Arc::clone(&config), Pipeline::new(tools, sink));
    let runtime = BotRuntime::new(
        TelegramApiClient::new("t".to_string()),
        Frontend::new(Arc::clone(&config), OPERATOR),
        launcher,
    )
    .with_poll_timing(Duration::from_secs(0), Duration::from_millis(10));

    let mut offset = None;
    let handled = runtime.poll_once(&mut offset).expect("poll");
    let requests = server.finish();
    std::env::remove_var(API_BASE_ENV);

    assert_eq!(handled, 4);
    assert_eq!(offset, Some(14));

    let paths: Vec<&str> = requests
        .iter()
        .map(|r| r.path.rsplit('/').next().unwrap_or_default())
        .collect();
    assert!(paths[0].starts_with("getUpdates"));
    assert_eq!(
        &paths[1..],
        &[
            "sendMessage",
            "answerCallbackQuery",
            "editMessageText",
            "sendMessage",
            "answerCallbackQuery"
        ]
    );

    let menu = requests[1].json();
    assert_eq!(menu["chat_id"], OPERATOR);
    assert_eq!(
        menu["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
        "manual_backup"
    );

    let launched = requests[3].json();
    assert_eq!(launched["message_id"], 5);
    assert!(launched["text"]
        .as_str()
        .unwrap_or_default()
        .contains("started in the background"));

    let denied = requests[4].json();
    assert_eq!(denied["chat_id"], INTRUDER);
    assert!(denied["text"].as_str().unwrap_or_default().contains("Access denied"));
    assert!(denied.get("reply_markup").is_none());

    let denied_callback = requests[5].json();
    assert_eq!(denied_callback["callback_query_id"], "cb-bad");
    assert_eq!(denied_callback["show_alert"], true);

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let messages = notifier.messages.lock().expect("lock").clone();
        if !messages.is_empty() {
            assert_eq!(messages.len(), 1);
            assert!(messages[0].contains("Backup failed"));
            assert!(messages[0].contains("source directory not found"));
            break;
        }
        assert!(Instant::now() < deadline, "launched job never reported");
        thread::sleep(Duration::from_millis(20));
    }
}
