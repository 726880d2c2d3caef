//! Integration tests for the chat server over real sockets.
//!
//! Each test binds the raw listener and the HTTP facade on ephemeral ports
//! and talks to them with plain TCP streams and `reqwest`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use chatd_server::{
    config::ServerConfig, infrastructure::OutboxPusher, ui::Server, usecase::ChatManager,
};
use chatd_shared::time::FixedClock;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::oneshot,
};

const TS: &str = "02-Jan-06 15:04";
const NAME_PROMPT: &str = "What's your name?: ";
const TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage server lifecycle
struct TestServer {
    raw_addr: SocketAddr,
    http_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a test server on ephemeral ports
    async fn start(max_history_lines: usize) -> Self {
        let config = ServerConfig {
            address: "127.0.0.1:0".into(),
            http_address: "127.0.0.1:0".into(),
            max_name_length: 16,
            msg_buffer_size: 64,
            max_history_lines,
            ..ServerConfig::default()
        };
        let manager = Arc::new(ChatManager::new(
            Arc::new(OutboxPusher),
            None,
            config.max_history_lines,
            Arc::new(FixedClock::from_unix_secs(1_136_214_245)),
        ));
        let bound = Server::new(manager, config).bind().await.unwrap();
        let raw_addr = bound.raw_addr().unwrap();
        let http_addr = bound.http_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(bound.serve(async move {
            let _ = rx.await;
        }));

        TestServer {
            raw_addr,
            http_addr,
            shutdown: Some(tx),
        }
    }

    fn chat_url(&self) -> String {
        format!("http://{}/chat", self.http_addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Helper struct for a raw TCP chat client
struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    /// Connect and consume the name prompt
    async fn connect(server: &TestServer) -> Self {
        let stream = TcpStream::connect(server.raw_addr).await.unwrap();
        let mut client = TestClient { stream };
        client.expect(NAME_PROMPT).await;
        client
    }

    /// Connect, send `name` and wait for the own join announcement
    async fn join(server: &TestServer, name: &str) -> Self {
        let mut client = Self::connect(server).await;
        client.send(&format!("{}\r\n", name)).await;
        client.expect(&format!("{} * {} has joined\n", TS, name)).await;
        client
    }

    async fn send(&mut self, text: &str) {
        self.stream.write_all(text.as_bytes()).await.unwrap();
    }

    /// Read exactly `expected.len()` bytes and compare
    async fn expect(&mut self, expected: &str) {
        let mut buf = vec![0u8; expected.len()];
        tokio::time::timeout(TIMEOUT, self.stream.read_exact(&mut buf))
            .await
            .expect("timed out waiting for server output")
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    /// Read until the server closes the connection
    async fn read_to_close(&mut self) -> String {
        let mut rest = Vec::new();
        tokio::time::timeout(TIMEOUT, self.stream.read_to_end(&mut rest))
            .await
            .expect("timed out waiting for close")
            .unwrap();
        String::from_utf8(rest).unwrap()
    }
}

async fn get_history(server: &TestServer, lines: Option<usize>) -> String {
    let client = reqwest::Client::new();
    let mut request = client.get(server.chat_url());
    if let Some(lines) = lines {
        request = request.query(&[("lines", lines.to_string())]);
    }
    let response = request.send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.text().await.unwrap()
}

#[tokio::test]
async fn test_two_clients_exchange_messages() {
    // テスト項目: 二人のクライアントが参加し、メッセージが双方に同じ順序で届き、履歴にも残る
    // given (前提条件):
    let server = TestServer::start(8).await;
    let mut u1 = TestClient::join(&server, "u1").await;
    let mut u2 = TestClient::join(&server, "u2").await;
    u1.expect(&format!("{} * u2 has joined\n", TS)).await;

    // when (操作):
    u1.send("hi\n").await;

    // then (期待する結果):
    let message = format!("{} <u1> hi\n", TS);
    u1.expect(&message).await;
    u2.expect(&message).await;
    assert_eq!(
        get_history(&server, Some(10)).await,
        format!(
            "{ts} * u1 has joined\n{ts} * u2 has joined\n{ts} <u1> hi\n",
            ts = TS
        )
    );
}

#[tokio::test]
async fn test_disconnect_announces_quit() {
    // テスト項目: クライアントが切断すると残りのクライアントに退出通知が届く
    // given (前提条件):
    let server = TestServer::start(8).await;
    let mut stayer = TestClient::join(&server, "stayer").await;
    let leaver = TestClient::join(&server, "leaver").await;
    stayer.expect(&format!("{} * leaver has joined\n", TS)).await;

    // when (操作):
    drop(leaver);

    // then (期待する結果):
    stayer.expect(&format!("{} * leaver has quit\n", TS)).await;
}

#[tokio::test]
async fn test_duplicate_name_is_disconnected() {
    // テスト項目: 使用中の名前で参加しようとすると切断メッセージを受け取って切断される
    // given (前提条件):
    let server = TestServer::start(8).await;
    let _first = TestClient::join(&server, "taken").await;
    let mut second = TestClient::connect(&server).await;

    // when (操作):
    second.send("taken\n").await;

    // then (期待する結果):
    assert_eq!(
        second.read_to_close().await,
        "Disconnecting: Another \"taken\" is already connected\n"
    );
}

#[tokio::test]
async fn test_http_post_reaches_raw_clients() {
    // テスト項目: HTTP で POST したメッセージが TCP クライアントに届く
    // given (前提条件):
    let server = TestServer::start(8).await;
    let mut listener = TestClient::join(&server, "listener").await;

    // when (操作):
    let response = reqwest::Client::new()
        .post(server.chat_url())
        .query(&[("name", "web")])
        .body("posted over http")
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    listener
        .expect(&format!("{} <web> posted over http\n", TS))
        .await;
}

#[tokio::test]
async fn test_http_rejects_bad_requests() {
    // テスト項目: 名前の無い POST、大きすぎる本文、未対応のメソッドが拒否される
    // given (前提条件):
    let server = TestServer::start(8).await;
    let client = reqwest::Client::new();

    // when (操作):
    let missing_name = client
        .post(server.chat_url())
        .body("hi")
        .send()
        .await
        .unwrap();
    let too_large = client
        .post(server.chat_url())
        .query(&[("name", "web")])
        .body("x".repeat(1024))
        .send()
        .await
        .unwrap();
    let wrong_method = client.put(server.chat_url()).send().await.unwrap();

    // then (期待する結果):
    assert_eq!(missing_name.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(missing_name.text().await.unwrap(), "missing name");
    assert_eq!(too_large.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(wrong_method.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    assert!(get_history(&server, None).await.is_empty());
}

#[tokio::test]
async fn test_http_history_is_bounded() {
    // テスト項目: HTTP の履歴取得は容量で制限され、古い行から消える
    // given (前提条件):
    let server = TestServer::start(2).await;
    let mut u1 = TestClient::join(&server, "u1").await;

    // when (操作):
    for text in ["a\n", "b\n"] {
        u1.send(text).await;
        u1.expect(&format!("{} <u1> {}", TS, text)).await;
    }

    // then (期待する結果):
    let expected = format!("{ts} <u1> a\n{ts} <u1> b\n", ts = TS);
    assert_eq!(get_history(&server, Some(100)).await, expected);
    assert_eq!(get_history(&server, None).await, expected);
}
