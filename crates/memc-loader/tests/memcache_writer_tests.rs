//! Tests for the memcached writer against a fake server on localhost

use memc_common::{CacheKey, MemcError};
use memc_loader::writer::{CacheWriter, MemcacheWriter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[derive(Clone, Copy)]
enum Behavior {
    /// Reply `STORED` to every set
    Store,
    /// Reply to every set with a fixed line
    Reply(&'static str),
    /// Read the set, never answer
    Hang,
}

#[derive(Default)]
struct FakeServer {
    connections: AtomicUsize,
    stored: Mutex<Vec<(String, Vec<u8>)>>,
}

/// Minimal memcached: answers `version` and handles `set` per `behavior`.
async fn start_server(behavior: Behavior) -> (String, Arc<FakeServer>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let server = Arc::new(FakeServer::default());

    let state = server.clone();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            state.connections.fetch_add(1, Ordering::SeqCst);
            let state = state.clone();
            tokio::spawn(async move {
                let mut socket = BufReader::new(socket);
                loop {
                    let mut header = String::new();
                    if socket.read_line(&mut header).await.unwrap_or(0) == 0 {
                        return;
                    }
                    let parts: Vec<&str> = header.split_whitespace().collect();
                    if parts.first() == Some(&"version") {
                        socket.get_mut().write_all(b"VERSION 1.6.21\r\n").await.unwrap();
                        continue;
                    }
                    assert_eq!(parts[0], "set");
                    assert_eq!(parts[2], "0");
                    assert_eq!(parts[3], "0");
                    let len: usize = parts[4].parse().unwrap();
                    let mut data = vec![0u8; len + 2];
                    socket.read_exact(&mut data).await.unwrap();
                    data.truncate(len);

                    match behavior {
                        Behavior::Store => {
                            state.stored.lock().unwrap().push((parts[1].to_string(), data));
                            socket.get_mut().write_all(b"STORED\r\n").await.unwrap();
                        },
                        Behavior::Reply(line) => {
                            socket
                                .get_mut()
                                .write_all(format!("{line}\r\n").as_bytes())
                                .await
                                .unwrap();
                        },
                        Behavior::Hang => {
                            tokio::time::sleep(Duration::from_secs(3600)).await;
                        },
                    }
                }
            });
        }
    });

    (addr, server)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_stores_payload_and_reuses_client() {
    let (addr, server) = start_server(Behavior::Store).await;
    let writer = MemcacheWriter::new(None, 1);

    writer
        .write(&addr, &CacheKey::new("idfa", "one"), b"\x0a\x02\x01\x02")
        .await
        .unwrap();
    writer
        .write(&addr, &CacheKey::new("idfa", "two"), b"\r\nbinary\r\n")
        .await
        .unwrap();

    let stored = server.stored.lock().unwrap().clone();
    assert_eq!(
        stored,
        vec![
            ("idfa:one".to_string(), b"\x0a\x02\x01\x02".to_vec()),
            ("idfa:two".to_string(), b"\r\nbinary\r\n".to_vec()),
        ]
    );
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_reply_is_failure() {
    let (addr, _server) = start_server(Behavior::Reply("SERVER_ERROR out of memory")).await;
    let writer = MemcacheWriter::new(None, 1);

    let err = writer
        .write(&addr, &CacheKey::new("gaid", "abc"), b"x")
        .await
        .unwrap_err();
    match err {
        MemcError::Cache { addr: failed, .. } => assert_eq!(failed, addr),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stalled_write_times_out() {
    let (addr, _server) = start_server(Behavior::Hang).await;
    let writer = MemcacheWriter::new(Some(Duration::from_millis(200)), 1);

    let err = writer
        .write(&addr, &CacheKey::new("adid", "abc"), b"x")
        .await
        .unwrap_err();
    assert!(matches!(err, MemcError::Timeout { .. }));
}
