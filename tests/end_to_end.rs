use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time,
};
use tsrv::{
    server::{ServerCfg, ServerCfgBuilder, TcpAcceptor},
    transform::TransformMode,
};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start(builder: ServerCfgBuilder) -> SocketAddr {
    start_with_workers(builder, 2).await
}

async fn start_with_workers(builder: ServerCfgBuilder, workers: usize) -> SocketAddr {
    let cfg: Arc<ServerCfg> = builder
        .listen_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
        .workers(workers)
        .build();
    let acceptor = TcpAcceptor::bind(cfg).await.unwrap();
    let addr = acceptor.local_addr();
    tokio::spawn(async move {
        let _ = acceptor.run().await;
    });
    addr
}

struct Response {
    head: String,
    body: Vec<u8>,
}

impl Response {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }
}

async fn read_response(sock: &mut TcpStream, buf: &mut Vec<u8>) -> Response {
    let head_end = loop {
        if let Some(p) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break p + 4;
        }
        let mut chunk = [0u8; 4096];
        let n = time::timeout(TIMEOUT, sock.read(&mut chunk))
            .await
            .unwrap()
            .unwrap();
        assert!(n > 0, "connection closed before response head");
        buf.extend_from_slice(&chunk[..n]);
    };
    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let mut rsp = Response {
        head,
        body: Vec::new(),
    };
    let len: usize = rsp
        .header("Content-Length")
        .map(|v| v.parse().unwrap())
        .unwrap_or(0);
    while buf.len() < head_end + len {
        let mut chunk = [0u8; 4096];
        let n = time::timeout(TIMEOUT, sock.read(&mut chunk))
            .await
            .unwrap()
            .unwrap();
        assert!(n > 0, "connection closed before response body");
        buf.extend_from_slice(&chunk[..n]);
    }
    rsp.body = buf[head_end..head_end + len].to_vec();
    buf.drain(..head_end + len);
    rsp
}

async fn assert_closed(sock: &mut TcpStream) {
    let mut rest = Vec::new();
    let n = time::timeout(TIMEOUT, sock.read_to_end(&mut rest))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n, 0, "unexpected trailing bytes: {:?}", rest);
}

#[tokio::test]
async fn keep_alive_passthrough_serves_sequential_requests() {
    let addr = start(ServerCfg::builder()).await;
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();

    for _ in 0..3 {
        sock.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        let rsp = read_response(&mut sock, &mut buf).await;
        assert!(rsp.head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert_eq!(rsp.header("Server"), Some("tsrv"));
        assert_eq!(rsp.header("Connection"), None);
        assert_eq!(rsp.header("Content-Type"), Some("text/plain"));
        assert_eq!(rsp.body, b"Hello World!\r\n");
    }
}

#[tokio::test]
async fn request_split_across_writes() {
    let addr = start(ServerCfg::builder()).await;
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();

    sock.write_all(b"POST /a?x=1 HTTP/1.1\r\nContent-Le").await.unwrap();
    time::sleep(Duration::from_millis(20)).await;
    sock.write_all(b"ngth: 3\r\n\r\nab").await.unwrap();
    time::sleep(Duration::from_millis(20)).await;
    sock.write_all(b"c").await.unwrap();

    let rsp = read_response(&mut sock, &mut buf).await;
    assert!(rsp.head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(rsp.body, b"Hello World!\r\n");
}

#[tokio::test]
async fn malformed_request_gets_error_and_close() {
    let addr = start(ServerCfg::builder()).await;
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();

    sock.write_all(b"\r\n\r\n").await.unwrap();
    let rsp = read_response(&mut sock, &mut buf).await;
    assert!(rsp.head.starts_with("HTTP/1.1 500 Error\r\n"));
    assert_eq!(rsp.header("Connection"), Some("close"));
    assert_eq!(rsp.body, b"Internal Server Error\n");
    assert_closed(&mut sock).await;
}

#[tokio::test]
async fn close_policy_closes_after_response() {
    let addr = start(ServerCfg::builder().keep_alive(false)).await;
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();

    sock.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let rsp = read_response(&mut sock, &mut buf).await;
    assert!(rsp.head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(rsp.header("Connection"), Some("close"));
    assert_closed(&mut sock).await;
}

#[tokio::test]
async fn digest_mode_returns_hex() {
    let addr = start(ServerCfg::builder().mode(TransformMode::Digest).payload_size(1000)).await;
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();

    sock.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let first = read_response(&mut sock, &mut buf).await;
    sock.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let second = read_response(&mut sock, &mut buf).await;

    assert_eq!(first.body.len(), 64);
    assert!(first
        .body
        .iter()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b)));
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn encrypt_mode_body_length() {
    let addr = start(ServerCfg::builder().mode(TransformMode::Encrypt).payload_size(32)).await;
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();

    sock.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let first = read_response(&mut sock, &mut buf).await;
    sock.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let second = read_response(&mut sock, &mut buf).await;

    // IV + 32 bytes + a full padding block
    assert_eq!(first.body.len(), 16 + 48);
    assert_ne!(first.body, second.body);
}

#[tokio::test]
async fn delay_is_applied_per_request() {
    let addr = start(ServerCfg::builder().delay(Duration::from_millis(50))).await;
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();

    let started = Instant::now();
    sock.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let rsp = read_response(&mut sock, &mut buf).await;
    assert!(rsp.head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

async fn timed_get(addr: SocketAddr, started: Instant) -> Duration {
    let mut sock = TcpStream::connect(addr).await.unwrap();
    let mut buf = Vec::new();
    sock.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
    let rsp = read_response(&mut sock, &mut buf).await;
    assert!(rsp.head.starts_with("HTTP/1.1 200 OK\r\n"));
    started.elapsed()
}

#[tokio::test]
async fn delay_holds_back_other_connections_on_the_same_worker() {
    let delay = Duration::from_millis(200);
    let addr = start_with_workers(ServerCfg::builder().delay(delay), 1).await;

    let started = Instant::now();
    let (a, b) = tokio::join!(timed_get(addr, started), timed_get(addr, started));

    // one loop serves both, so the second response waits out both delays
    assert!(a.min(b) >= delay);
    assert!(a.max(b) >= delay * 2, "a: {:?}, b: {:?}", a, b);
}

#[tokio::test]
async fn connections_are_independent() {
    let addr = start(ServerCfg::builder()).await;
    let mut bad = TcpStream::connect(addr).await.unwrap();
    let mut good = TcpStream::connect(addr).await.unwrap();
    let (mut bad_buf, mut good_buf) = (Vec::new(), Vec::new());

    bad.write_all(b"BROKEN\r\n\r\n").await.unwrap();
    good.write_all(b"GET /ok HTTP/1.1\r\nHost: x\r\n\r\n").await.unwrap();

    let rsp = read_response(&mut bad, &mut bad_buf).await;
    assert!(rsp.head.starts_with("HTTP/1.1 500 Error\r\n"));
    let rsp = read_response(&mut good, &mut good_buf).await;
    assert!(rsp.head.starts_with("HTTP/1.1 200 OK\r\n"));
}
