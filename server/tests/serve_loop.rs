mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use gamereviews::handlers::http::routes::build_router;
use gamereviews::serve::{ConnectionLimits, serve};

use common::TestApp;

#[tokio::test]
async fn shutdown_is_honoured_while_at_the_connection_cap() {
    let app = TestApp::new().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let limits = ConnectionLimits {
        max_connections: 1,
        request_timeout: Duration::from_secs(30),
    };
    let server = tokio::spawn(serve(
        listener,
        app.state.clone(),
        Arc::new(build_router()),
        limits,
        async move {
            let _ = stopped.await;
        },
    ));

    // An idle keep-alive client holds the only slot; the second connection
    // leaves the loop waiting for a permit.
    let _held = TcpStream::connect(addr).await.unwrap();
    let _queued = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    stop.send(()).unwrap();

    let finished = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("accept loop did not stop");
    finished.unwrap().unwrap();
}

#[tokio::test]
async fn serves_requests_over_tcp() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let app = TestApp::new().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let limits = ConnectionLimits {
        max_connections: 4,
        request_timeout: Duration::from_secs(30),
    };
    let server = tokio::spawn(serve(
        listener,
        app.state.clone(),
        Arc::new(build_router()),
        limits,
        async move {
            let _ = stopped.await;
        },
    ));

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    client.read_to_string(&mut raw).await.unwrap();
    assert!(raw.starts_with("HTTP/1.1 200"), "{}", raw);
    assert!(raw.contains(r#""health":"ok""#));

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
