//! HTTP sync against a throwaway loopback server.
//!
//! The server answers a fixed script of responses, one connection each,
//! and hands back the requests it saw.

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use todos::model::task::TaskList;
use todos::sync::http::{Credentials, HttpStore};
use todos::sync::{RemoteStore, SyncError};

const REMOTE_DOC: &str = r#"{
  "todos": [
    {"id": 1, "title": "remote one", "created_at": "2025-05-01T10:00:00Z"},
    {"id": 5, "title": "remote five", "created_at": "2025-05-02T10:00:00Z", "priority": "high"}
  ],
  "next_id": 6
}"#;

#[derive(Debug)]
struct Seen {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Seen {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a server that answers `script` in order. Returns its base URL and
/// a handle yielding the recorded requests.
fn serve(script: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Seen>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (code, body) in script {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((k, v)) = line.split_once(':') {
                    headers.push((k.trim().to_string(), v.trim().to_string()));
                }
            }
            let length = headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.parse::<usize>().ok())
                .unwrap_or(0);
            let mut req_body = vec![0; length];
            reader.read_exact(&mut req_body).unwrap();

            let reason = match code {
                200 => "OK",
                404 => "Not Found",
                500 => "Internal Server Error",
                _ => "Status",
            };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                code,
                reason,
                body.len(),
                body
            );
            let mut stream = stream;
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            seen.push(Seen {
                method,
                path,
                headers,
                body: req_body,
            });
        }
        seen
    });
    (base, handle)
}

fn store(base: &str, credentials: Credentials) -> HttpStore {
    HttpStore::new(base, credentials, Duration::from_secs(5)).unwrap()
}

// ---------------------------------------------------------------------------
// HttpStore
// ---------------------------------------------------------------------------

#[test]
fn fetch_sends_basic_auth() {
    let (base, server) = serve(vec![(200, REMOTE_DOC)]);
    let list = store(&base, Credentials::new("user", "pass")).fetch().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.next_id, 6);
    assert_eq!(list.todos[1].title, "remote five");

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/api/todos");
    // base64("user:pass")
    assert_eq!(seen[0].header("authorization"), Some("Basic dXNlcjpwYXNz"));
}

#[test]
fn incomplete_credentials_send_no_auth() {
    let (base, server) = serve(vec![(200, REMOTE_DOC)]);
    store(&base, Credentials::new("user", "")).fetch().unwrap();
    let seen = server.join().unwrap();
    assert_eq!(seen[0].header("authorization"), None);
}

#[test]
fn store_posts_whole_document() {
    let (base, server) = serve(vec![(200, "")]);
    let list: TaskList = serde_json::from_str(REMOTE_DOC).unwrap();
    store(&format!("{}/", base), Credentials::default())
        .store(&list)
        .unwrap();

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/api/todos");
    assert_eq!(seen[0].header("content-type"), Some("application/json"));
    let sent: TaskList = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(sent, list);
}

#[test]
fn error_status_carries_body() {
    let (base, server) = serve(vec![(500, "boom\n")]);
    let err = store(&base, Credentials::default()).fetch().unwrap_err();
    match err {
        SyncError::Status { code, body } => {
            assert_eq!(code, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    server.join().unwrap();
}

#[test]
fn garbage_body_is_decode_error() {
    let (base, server) = serve(vec![(200, "<html>")]);
    let err = store(&base, Credentials::default()).fetch().unwrap_err();
    assert!(matches!(err, SyncError::Decode(_)));
    server.join().unwrap();
}

// ---------------------------------------------------------------------------
// CLI round trips
// ---------------------------------------------------------------------------

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "").unwrap();
    dir
}

fn run_todo(dir: &Path, args: &[&str]) -> String {
    let output = Command::new(PathBuf::from(env!("CARGO_BIN_EXE_todo")))
        .args(args)
        .current_dir(dir)
        .env_remove("TODO_FILE")
        .env("TODO_CONFIG", dir.join("config.toml"))
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run todo");
    assert!(output.status.success(), "todo {:?} failed", args);
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn local_doc(dir: &Path) -> TaskList {
    serde_json::from_str(&fs::read_to_string(dir.join("todos.json")).unwrap()).unwrap()
}

#[test]
fn sync_merges_local_first_and_pushes_back() {
    let dir = workspace();
    run_todo(dir.path(), &["add", "local one"]);

    let (base, server) = serve(vec![(200, REMOTE_DOC), (200, "")]);
    let out = run_todo(dir.path(), &["sync", &base, "user", "pass"]);
    assert!(out.contains("Successfully synced 2 todos"));

    let local = local_doc(dir.path());
    let titles: Vec<&str> = local.todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["local one", "remote five"]);
    assert_eq!(local.next_id, 6);

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[1].method, "POST");
    let pushed: TaskList = serde_json::from_slice(&seen[1].body).unwrap();
    assert_eq!(pushed, local);
}

#[test]
fn sync_pushes_when_fetch_fails() {
    let dir = workspace();
    run_todo(dir.path(), &["add", "only local"]);

    let (base, server) = serve(vec![(500, "down"), (200, "")]);
    let out = run_todo(dir.path(), &["sync", &base]);
    assert!(out.contains("Error loading from network"));
    assert!(out.contains("Saving local todos to network instead..."));
    assert!(out.contains("Successfully saved 1 todos"));

    let seen = server.join().unwrap();
    let pushed: TaskList = serde_json::from_slice(&seen[1].body).unwrap();
    assert_eq!(pushed.todos[0].title, "only local");
}

#[test]
fn sync_does_not_overwrite_unreadable_remote() {
    let dir = workspace();
    run_todo(dir.path(), &["add", "only local"]);
    let before = fs::read_to_string(dir.path().join("todos.json")).unwrap();

    let (base, server) = serve(vec![(200, "<html>")]);
    let out = run_todo(dir.path(), &["sync", &base]);
    assert!(out.contains("Error syncing todos"));
    assert!(!out.contains("Successfully"));

    let seen = server.join().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(fs::read_to_string(dir.path().join("todos.json")).unwrap(), before);
}

#[test]
fn load_replaces_local_list() {
    let dir = workspace();
    run_todo(dir.path(), &["add", "to be replaced"]);

    let (base, server) = serve(vec![(200, REMOTE_DOC)]);
    let out = run_todo(dir.path(), &["load", &base]);
    assert!(out.contains("Successfully loaded 2 todos"));
    server.join().unwrap();

    let local = local_doc(dir.path());
    assert_eq!(local.todos[0].title, "remote one");
    assert_eq!(local.len(), 2);
}

#[test]
fn save_failure_leaves_local_alone() {
    let dir = workspace();
    run_todo(dir.path(), &["add", "keep me"]);
    let before = fs::read_to_string(dir.path().join("todos.json")).unwrap();

    let (base, server) = serve(vec![(500, "nope")]);
    let out = run_todo(dir.path(), &["save", &base]);
    assert!(out.contains("❌ Error saving todos"));
    server.join().unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("todos.json")).unwrap(), before);
}
