use std::fs;
use std::net::SocketAddr;

use fixtureserver::config::manager::ConfigManager;
use fixtureserver::http::server;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const CONFIG: &str = r#"
server_port: 0
routes:
  - method: GET
    route: /teams
    response_file: teams.json
  - method: GET
    route: /settings
    response_file: settings.json
  - method: POST
    route: /teams
    response_file: created.json
  - method: PATCH
    route: /teams
    response_file: created.json
"#;

async fn start_server() -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("teams.json"),
        r#"[{"id":"1","name":"Alpha"},{"id":"2","name":"Beta"}]"#,
    )
    .unwrap();
    fs::write(dir.path().join("settings.json"), r#"{"theme":"dark","lang":"en"}"#).unwrap();
    fs::write(dir.path().join("created.json"), r#"{"status":"created"}"#).unwrap();
    fs::write(dir.path().join("config.yaml"), CONFIG).unwrap();

    let manager = ConfigManager::new(dir.path().join("config.yaml")).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, manager.routes_handle()));

    (addr, dir)
}

async fn send(addr: SocketAddr, raw: &str) -> (u16, String, Value) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut reply = String::new();
    stream.read_to_string(&mut reply).await.unwrap();

    let (head, body) = reply.split_once("\r\n\r\n").unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    (status, head.to_string(), serde_json::from_str(body).unwrap())
}

async fn get(addr: SocketAddr, target: &str) -> (u16, Value) {
    let (status, _, body) = send(addr, &format!("GET {target} HTTP/1.1\r\nHost: test\r\n\r\n")).await;
    (status, body)
}

#[tokio::test]
async fn get_filters_by_query_parameter() {
    let (addr, _dir) = start_server().await;

    let (status, body) = get(addr, "/teams?id=2").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([{"id": "2", "name": "Beta"}]));
}

#[tokio::test]
async fn get_without_query_returns_whole_fixture() {
    let (addr, _dir) = start_server().await;

    let (status, body) = get(addr, "/teams").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([{"id": "1", "name": "Alpha"}, {"id": "2", "name": "Beta"}]));
}

#[tokio::test]
async fn get_with_unmatched_query_returns_empty_list() {
    let (addr, _dir) = start_server().await;

    let (status, body) = get(addr, "/teams?name=Gamma").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn object_fixture_filters_to_values() {
    let (addr, _dir) = start_server().await;

    let (status, body) = get(addr, "/settings?theme=dark").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!(["dark"]));
}

#[tokio::test]
async fn object_fixture_without_query_is_server_error() {
    let (addr, _dir) = start_server().await;

    let (status, body) = get(addr, "/settings").await;
    assert_eq!(status, 500);
    assert!(body["error"].is_string());

    // The server keeps answering after the failed request.
    let (status, _) = get(addr, "/teams").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn post_returns_fixture_regardless_of_input() {
    let (addr, _dir) = start_server().await;

    let payload = r#"{"name":"Gamma"}"#;
    let raw = format!(
        "POST /teams?id=9 HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        payload.len(),
        payload
    );
    let (status, head, body) = send(addr, &raw).await;
    assert_eq!(status, 200);
    assert!(head.contains("Content-Type: application/json"));
    assert_eq!(body, json!({"status": "created"}));
}

#[tokio::test]
async fn skipped_method_and_unknown_path_are_not_found() {
    let (addr, _dir) = start_server().await;

    let (status, _, body) = send(addr, "PATCH /teams HTTP/1.1\r\n\r\n").await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"error": "Cannot PATCH /teams"}));

    let (status, _) = get(addr, "/players").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn oversized_body_is_refused_and_server_keeps_serving() {
    let (addr, _dir) = start_server().await;

    let (status, _, body) = send(
        addr,
        "POST /teams HTTP/1.1\r\nContent-Length: 100000000000000\r\n\r\n",
    )
    .await;
    assert_eq!(status, 413);
    assert!(body["error"].is_string());

    let (status, body) = get(addr, "/teams?id=1").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([{"id": "1", "name": "Alpha"}]));
}

#[tokio::test]
async fn lowercase_request_method_is_not_routed() {
    let (addr, _dir) = start_server().await;

    let (status, _, _) = send(addr, "get /teams HTTP/1.1\r\n\r\n").await;
    assert_eq!(status, 404);
}
