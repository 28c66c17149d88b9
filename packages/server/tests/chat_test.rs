//! Integration tests for the board chat server.
//!
//! Each test runs the real router on an ephemeral port and talks to it with
//! WebSocket clients.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use boardchat_server::{
    config::{ChatConfig, RoomConfig},
    domain::BoardId,
    infrastructure::{
        dto::{
            http::{RoomDetailDto, RoomSummaryDto},
            websocket::{ChatMessage, MessageType},
        },
        hub::Hub,
        identity::TrustedQueryIdentity,
        store::InMemoryMessageStore,
    },
    ui::{AppState, router},
};
use boardchat_shared::time::SystemClock;
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    hub: Arc<Hub>,
    store: Arc<InMemoryMessageStore>,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with(ChatConfig::default()).await
    }

    async fn start_with(config: ChatConfig) -> Self {
        let store = Arc::new(InMemoryMessageStore::new());
        let hub = Arc::new(Hub::new(RoomConfig::from(&config)));
        let state = AppState::new(
            hub.clone(),
            Arc::new(TrustedQueryIdentity),
            store.clone(),
            Arc::new(SystemClock),
            config,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let app = router(Arc::new(state));
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        TestServer {
            addr,
            hub,
            store,
            task,
        }
    }

    fn chat_url(&self, query: &str) -> String {
        format!("ws://{}/api/chat?{}", self.addr, query)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect and wait until the room has registered the session.
    async fn join(&self, board: &str, user: &str, email: &str) -> Client {
        let before = self.member_count(board).await;
        let url = self.chat_url(&format!("board_id={}&user_id={}&email={}", board, user, email));
        let (client, _) = connect_async(url).await.expect("Failed to connect");
        self.wait_for_members(board, before + 1).await;
        client
    }

    async fn member_count(&self, board: &str) -> usize {
        let response = reqwest::get(self.http_url(&format!("/api/rooms/{}", board)))
            .await
            .expect("HTTP request failed");
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return 0;
        }
        let detail: RoomDetailDto = response.json().await.expect("Invalid room detail");
        detail.members.len()
    }

    async fn wait_for_members(&self, board: &str, expected: usize) {
        tokio::time::timeout(RECV_TIMEOUT, async {
            while self.member_count(board).await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Room never reached the expected member count");
    }

    async fn wait_for_stored(&self, board: &str, expected: usize) {
        let board = BoardId::new(board.to_string()).expect("Invalid board id");
        tokio::time::timeout(RECV_TIMEOUT, async {
            while self.store.count(&board).await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Message was never persisted");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.hub.shutdown();
        self.task.abort();
    }
}

async fn send_text(client: &mut Client, json: &str) {
    client
        .send(Message::Text(json.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next chat frame, skipping control frames.
async fn next_chat(client: &mut Client) -> ChatMessage {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str::<ChatMessage>(text.as_str())
                        .expect("Server sent invalid JSON");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("Expected a chat frame, got {:?}", other),
            }
        }
    })
    .await
    .expect("Timed out waiting for a chat frame")
}

async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "Expected no frame, got {:?}", result);
}

#[tokio::test]
async fn test_message_broadcast_with_server_stamped_fields() {
    // テスト項目: 同じボードの全員（送信者を含む）にサーバーが上書きしたフィールドで届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.join("board-1", "alice", "alice@example.com").await;
    let mut bob = server.join("board-1", "bob", "bob@example.com").await;

    // when (操作):
    send_text(
        &mut alice,
        r#"{"type":"text","content":"hi","sender_id":"mallory","board_id":"board-9","timestamp":1}"#,
    )
    .await;

    // then (期待する結果):
    for client in [&mut bob, &mut alice] {
        let message = next_chat(client).await;
        assert_eq!(message.r#type, MessageType::Text);
        assert_eq!(message.content, "hi");
        assert_eq!(message.sender_id, "alice");
        assert_eq!(message.sender_email, "alice@example.com");
        assert_eq!(message.board_id, "board-1");
        assert!(message.timestamp > 1);
    }
}

#[tokio::test]
async fn test_boards_are_isolated() {
    // テスト項目: 別のボードのメッセージは届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.join("board-1", "alice", "").await;
    let mut dave = server.join("board-2", "dave", "").await;

    // when (操作):
    send_text(&mut alice, r#"{"content":"only board-1"}"#).await;

    // then (期待する結果):
    assert_eq!(next_chat(&mut alice).await.content, "only board-1");
    assert_silent(&mut dave).await;
}

#[tokio::test]
async fn test_history_is_replayed_privately_to_joiner() {
    // テスト項目: 後から参加したセッションにだけ履歴が history として届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.join("board-1", "alice", "alice@example.com").await;
    send_text(&mut alice, r#"{"type":"text","content":"hi"}"#).await;
    let live = next_chat(&mut alice).await;
    server.wait_for_stored("board-1", 1).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    // when (操作):
    let mut carol = server.join("board-1", "carol", "carol@example.com").await;

    // then (期待する結果):
    let history = next_chat(&mut carol).await;
    assert_eq!(history.r#type, MessageType::History);
    assert_eq!(history.content, "hi");
    assert_eq!(history.sender_id, "alice");
    assert_eq!(history.sender_email, "alice@example.com");
    assert_eq!(history.board_id, "board-1");
    assert_eq!(history.timestamp, live.timestamp);
    assert_silent(&mut alice).await;
}

#[tokio::test]
async fn test_missing_parameters_are_rejected() {
    // テスト項目: board_id または user_id がなければ HTTP 400 で拒否され、ルームも作られない
    // given (前提条件):
    let server = TestServer::start().await;

    for query in ["user_id=alice", "board_id=board-1", "board_id=&user_id=alice"] {
        // when (操作):
        let result = connect_async(server.chat_url(query)).await;

        // then (期待する結果):
        match result {
            Err(tungstenite::Error::Http(response)) => {
                assert_eq!(response.status(), 400, "query: {}", query)
            }
            other => panic!("Expected HTTP 400 for '{}', got {:?}", query, other.map(|_| ())),
        }
    }
    let rooms: Vec<RoomSummaryDto> = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(rooms.is_empty());
}

#[tokio::test]
async fn test_malformed_frame_closes_connection() {
    // テスト項目: 不正なフレームを送ると接続が閉じられ、ルームから外れる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.join("board-1", "alice", "").await;

    // when (操作):
    send_text(&mut alice, "this is not json").await;

    // then (期待する結果):
    let closed = tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            match alice.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok());
    server.wait_for_members("board-1", 0).await;
}

/// A `{"content":"..."}` frame of exactly `len` bytes.
fn frame_of_len(len: usize) -> String {
    let envelope = r#"{"content":""}"#.len();
    format!(r#"{{"content":"{}"}}"#, "x".repeat(len - envelope))
}

#[tokio::test]
async fn test_oversized_frame_closes_sender_only() {
    // テスト項目: 2048 バイトを超えるフレームを送ると送信者だけが外され、他の参加者には何も届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.join("board-1", "alice", "").await;
    let mut bob = server.join("board-1", "bob", "").await;

    // when (操作):
    send_text(&mut alice, &frame_of_len(3000)).await;

    // then (期待する結果):
    server.wait_for_members("board-1", 1).await;
    let detail: RoomDetailDto = reqwest::get(server.http_url("/api/rooms/board-1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail.members[0].user_id, "bob");
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_frame_at_size_limit_is_delivered() {
    // テスト項目: ちょうど 2048 バイトのフレームは受け付けられ配信される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.join("board-1", "alice", "").await;
    let mut bob = server.join("board-1", "bob", "").await;
    let frame = frame_of_len(2048);
    assert_eq!(frame.len(), 2048);

    // when (操作):
    send_text(&mut alice, &frame).await;

    // then (期待する結果):
    let received = next_chat(&mut bob).await;
    assert_eq!(received.content.len(), 2048 - r#"{"content":""}"#.len());
    assert_eq!(received.sender_id, "alice");
}

#[tokio::test]
async fn test_rooms_endpoints() {
    // テスト項目: ルーム一覧と詳細が取得でき、存在しないボードは 404 になる
    // given (前提条件):
    let server = TestServer::start().await;
    let _alice = server.join("board-1", "alice", "alice@example.com").await;
    let _bob = server.join("board-1", "bob", "").await;

    // when (操作):
    let rooms: Vec<RoomSummaryDto> = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail: RoomDetailDto = reqwest::get(server.http_url("/api/rooms/board-1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing = reqwest::get(server.http_url("/api/rooms/nowhere")).await.unwrap();
    let health = reqwest::get(server.http_url("/api/health")).await.unwrap();

    // then (期待する結果):
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].board_id, "board-1");
    assert_eq!(rooms[0].member_count, 2);
    assert_eq!(rooms[0].members, vec!["alice", "bob"]);
    assert_eq!(detail.members[0].email, "alice@example.com");
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(health.status().is_success());
}

#[tokio::test]
async fn test_presence_notices_when_enabled() {
    // テスト項目: 在室通知を有効にすると参加と退出が他の参加者に通知される
    // given (前提条件):
    let server = TestServer::start_with(ChatConfig {
        presence_notices: true,
        ..ChatConfig::default()
    })
    .await;
    let mut alice = server.join("board-1", "alice", "alice@example.com").await;

    // when (操作):
    let mut bob = server.join("board-1", "bob", "bob@example.com").await;
    bob.close(None).await.expect("Failed to close");

    // then (期待する結果):
    let joined = next_chat(&mut alice).await;
    assert_eq!(joined.r#type, MessageType::Join);
    assert_eq!(joined.sender_id, "bob");
    let left = next_chat(&mut alice).await;
    assert_eq!(left.r#type, MessageType::Leave);
    assert_eq!(left.sender_id, "bob");
}
