//! End-to-end tests: a real server on an ephemeral port, driven by the
//! protocol client (and by raw framed sockets where the client is too
//! well-behaved to produce the traffic under test).

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use rift_server::protocol::framing::{FrameSocket, RecvOutcome};
use rift_server::protocol::version::ProtocolVersion;
use rift_server::server::{CommandStats, ShutdownHandle};
use rift_server::client::ClientError;
use rift_server::{Client, Server, ServerConfig};

const RECV_TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

struct TestServer {
    addr: SocketAddr,
    stats: Arc<CommandStats>,
    shutdown: ShutdownHandle,
    root: TempDir,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start(max_sessions: usize) -> Self {
        let root = TempDir::new().unwrap();
        let config = ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            storage_root: root.path().to_string_lossy().into_owned(),
            max_sessions,
            recv_timeout_secs: 5,
            ..ServerConfig::default()
        };

        let server = Server::bind(config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let stats = server.stats();
        let shutdown = server.shutdown_handle();
        let task = tokio::spawn(server.run());

        Self {
            addr,
            stats,
            shutdown,
            root,
            task,
        }
    }

    fn addr(&self) -> String {
        self.addr.to_string()
    }

    async fn connect_as(&self, username: &str) -> Client {
        let mut client = Client::connect(&self.addr(), ProtocolVersion::PerUser, RECV_TIMEOUT)
            .await
            .unwrap();
        client.login(username).await.unwrap();
        client
    }

    async fn stop(self) {
        self.shutdown.shutdown();
        self.task.await.unwrap();
    }
}

#[tokio::test]
async fn handshake_provisions_namespace_and_empty_list_is_no_content() {
    let server = TestServer::start(4).await;

    let mut client = server.connect_as("alice").await;
    assert!(server.root.path().join("alice").is_dir());

    let names = client.list().await.unwrap();
    assert!(names.is_empty());

    client.exit().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn unknown_version_is_fatal_with_no_side_effects() {
    let server = TestServer::start(4).await;

    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut conn = FrameSocket::new(stream, RECV_TIMEOUT);
    let mut buf = [0u8; 512];

    match conn.recv_frame(&mut buf).await {
        RecvOutcome::Frame(n) => assert_eq!(&buf[..n], b"200 OK"),
        other => panic!("expected greeting, got {:?}", other),
    }

    conn.send_text("9.9").await.unwrap();
    match conn.recv_frame(&mut buf).await {
        RecvOutcome::Frame(n) => {
            assert_eq!(&buf[..n], b"400 BAD REQUEST: Invalid version.")
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    match conn.recv_frame(&mut buf).await {
        RecvOutcome::Disconnected => {}
        other => panic!("expected close after rejection, got {:?}", other),
    }

    // No namespace or file was created for the failed session
    assert_eq!(fs::read_dir(server.root.path()).unwrap().count(), 0);
    server.stop().await;
}

#[tokio::test]
async fn invalid_username_is_rejected() {
    let server = TestServer::start(4).await;

    let mut client = Client::connect(&server.addr(), ProtocolVersion::PerUser, RECV_TIMEOUT)
        .await
        .unwrap();
    match client.login("not valid!").await {
        Err(ClientError::Refused(status)) => {
            assert_eq!(status, "400 BAD REQUEST: Invalid username.")
        }
        other => panic!("expected refusal, got {:?}", other),
    }

    assert_eq!(fs::read_dir(server.root.path()).unwrap().count(), 0);
    server.stop().await;
}

#[tokio::test]
async fn existing_namespace_is_reused_across_sessions() {
    let server = TestServer::start(4).await;
    let src_dir = TempDir::new().unwrap();
    let src = src_dir.path().join("keep.txt");
    fs::write(&src, b"persisted").unwrap();

    let mut first = server.connect_as("bob").await;
    first.put(&src, "keep.txt").await.unwrap();
    first.exit().await.unwrap();

    let mut second = server.connect_as("bob").await;
    let names = second.list().await.unwrap();
    assert_eq!(names, vec!["keep.txt".to_string()]);
    second.exit().await.unwrap();

    server.stop().await;
}

#[tokio::test]
async fn put_then_get_round_trips_bytes() {
    let server = TestServer::start(4).await;
    let work = TempDir::new().unwrap();

    // Several chunks plus a ragged tail
    let content: Vec<u8> = (0..5000).map(|i| (i * 31 % 256) as u8).collect();
    let src = work.path().join("src.bin");
    let dst = work.path().join("dst.bin");
    fs::write(&src, &content).unwrap();

    let mut client = server.connect_as("carol").await;
    assert_eq!(client.put(&src, "report.bin").await.unwrap(), 5000);
    assert_eq!(client.get("report.bin", &dst).await.unwrap(), 5000);
    assert_eq!(fs::read(&dst).unwrap(), content);

    client.exit().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn get_missing_file_is_404_and_session_continues() {
    let server = TestServer::start(4).await;
    let work = TempDir::new().unwrap();

    let mut client = server.connect_as("dave").await;
    match client.get("nonexistent.txt", &work.path().join("out")).await {
        Err(ClientError::Refused(status)) => {
            assert_eq!(status, "404 NOT FOUND: File does not exist.")
        }
        other => panic!("expected 404, got {:?}", other),
    }

    // No stray content frames were sent; the loop is still in sync
    assert!(client.list().await.unwrap().is_empty());

    client.exit().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn invalid_filenames_reject_only_the_command() {
    let server = TestServer::start(4).await;

    let mut client = server.connect_as("erin").await;
    for line in ["GET ../x", "PUT a/b", "DELETE .", "INFO ", "GET a\\b"] {
        let status = client.request(line).await.unwrap();
        assert_eq!(status, "400 BAD REQUEST: Invalid filename.", "for {line:?}");
    }

    // Recognized actions count even when the argument is invalid
    assert_eq!(server.stats.count("GET"), 2);
    assert_eq!(server.stats.count("PUT"), 1);
    assert_eq!(server.stats.count("DELETE"), 1);
    assert_eq!(server.stats.count("INFO"), 1);

    // The session is still healthy
    assert!(client.list().await.unwrap().is_empty());
    assert!(server.root.path().join("erin").is_dir());

    client.exit().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn unknown_command_gets_bad_request() {
    let server = TestServer::start(4).await;

    let mut client = server.connect_as("frank").await;
    let status = client.request("FETCH thing.txt").await.unwrap();
    assert_eq!(status, "400 BAD REQUEST: Invalid command.");

    client.exit().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn delete_and_info_lifecycle() {
    let server = TestServer::start(4).await;
    let work = TempDir::new().unwrap();
    let src = work.path().join("doc.txt");
    fs::write(&src, b"hello world").unwrap();

    let mut client = server.connect_as("grace").await;
    client.put(&src, "doc.txt").await.unwrap();

    let report = client.info("doc.txt").await.unwrap();
    assert!(report.contains("Size: 11 bytes"));
    assert!(report.contains("Permissions: "));

    client.delete("doc.txt").await.unwrap();
    match client.delete("doc.txt").await {
        Err(ClientError::Refused(status)) => assert!(status.starts_with("404")),
        other => panic!("expected 404, got {:?}", other),
    }
    match client.info("doc.txt").await {
        Err(ClientError::Refused(status)) => assert!(status.starts_with("404")),
        other => panic!("expected 404, got {:?}", other),
    }

    client.exit().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn legacy_version_shares_the_storage_root() {
    let server = TestServer::start(4).await;
    let work = TempDir::new().unwrap();
    let src = work.path().join("shared.txt");
    fs::write(&src, b"legacy data").unwrap();

    let mut client = Client::connect(&server.addr(), ProtocolVersion::Legacy, RECV_TIMEOUT)
        .await
        .unwrap();
    client.put(&src, "shared.txt").await.unwrap();

    // The file lands directly in the root, not in a per-user directory
    assert!(server.root.path().join("shared.txt").is_file());
    assert_eq!(client.list().await.unwrap(), vec!["shared.txt".to_string()]);

    client.exit().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn capacity_refusal_happens_before_handshake() {
    let server = TestServer::start(1).await;

    // Fill the single slot with a fully admitted session
    let admitted = server.connect_as("henry").await;

    // The next connection is refused without the server reading anything
    let stream = TcpStream::connect(server.addr).await.unwrap();
    let mut conn = FrameSocket::new(stream, RECV_TIMEOUT);
    let mut buf = [0u8; 512];
    match conn.recv_frame(&mut buf).await {
        RecvOutcome::Frame(n) => assert_eq!(
            &buf[..n],
            b"503 SERVICE UNAVAILABLE: Server is at capacity. Try again later."
        ),
        other => panic!("expected refusal, got {:?}", other),
    }
    match conn.recv_frame(&mut buf).await {
        RecvOutcome::Disconnected => {}
        other => panic!("expected close after refusal, got {:?}", other),
    }

    // Once the admitted session ends, its slot frees up again
    admitted.exit().await.unwrap();
    let mut reconnected = None;
    for _ in 0..50 {
        match Client::connect(&server.addr(), ProtocolVersion::Legacy, RECV_TIMEOUT).await {
            Ok(client) => {
                reconnected = Some(client);
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }
    let client = reconnected.expect("slot never freed after session ended");

    client.exit().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn concurrent_sessions_count_commands_without_lost_updates() {
    let server = TestServer::start(8).await;
    let work = TempDir::new().unwrap();
    let addr = server.addr();

    let mut tasks = Vec::new();
    for i in 0..5 {
        let addr = addr.clone();
        let src = work.path().join(format!("src-{i}.txt"));
        fs::write(&src, format!("payload {i}")).unwrap();

        tasks.push(tokio::spawn(async move {
            let mut client = Client::connect(&addr, ProtocolVersion::PerUser, RECV_TIMEOUT)
                .await
                .unwrap();
            client.login(&format!("user{i}")).await.unwrap();
            client.put(&src, "data.txt").await.unwrap();
            client.exit().await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(server.stats.count("PUT"), 5);

    // Each username got its own isolated copy
    for i in 0..5 {
        let path = server.root.path().join(format!("user{i}")).join("data.txt");
        assert_eq!(fs::read(&path).unwrap(), format!("payload {i}").as_bytes());
    }

    server.stop().await;
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_sessions() {
    let server = TestServer::start(4).await;

    let client = server.connect_as("iris").await;
    server.shutdown.shutdown();

    // The running session still gets to finish cleanly
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!server.task.is_finished());

    client.exit().await.unwrap();
    server.task.await.unwrap();
}
