use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::timeout;
use todos::todo::MemoryStore;
use todos::{Server, api};

async fn read_until(stream: &mut TcpStream, suffix: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.ends_with(suffix) {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the response completed");
        buf.extend_from_slice(&chunk[..n]);
    }
    buf
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive_connections() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(
            api::routes(Arc::new(MemoryStore::new())),
            async move {
                let _ = stopped.await;
            },
        ),
    );

    // One request on a connection that stays open afterwards.
    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /api/todos HTTP/1.1\r\nhost: localhost\r\n\r\n")
        .await
        .unwrap();
    let res = timeout(Duration::from_secs(5), read_until(&mut client, b"[]"))
        .await
        .expect("response in time");
    assert!(res.starts_with(b"HTTP/1.1 200 OK"));

    stop.send(()).unwrap();

    let served = timeout(Duration::from_secs(5), server)
        .await
        .expect("serve returns after shutdown while a keep-alive connection is open");
    served.unwrap().unwrap();

    // The server side hung up on the idle connection.
    let mut rest = Vec::new();
    let n = timeout(Duration::from_secs(5), client.read_to_end(&mut rest))
        .await
        .expect("connection closed")
        .unwrap_or(0);
    assert_eq!(n, 0);
}

#[tokio::test]
async fn shutdown_without_connections_returns_at_once() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let served = timeout(
        Duration::from_secs(5),
        Server::from_listener(listener)
            .serve_with_shutdown(api::routes(Arc::new(MemoryStore::new())), async {}),
    )
    .await
    .expect("serve returns");
    assert!(served.is_ok());
}
