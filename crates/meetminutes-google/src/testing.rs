//! Minimal loopback HTTP stub for exercising the service clients in tests.
//!
//! Serves canned responses per route and records every request so tests can
//! assert call counts and payloads. Only compiled for tests.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One request the stub saw.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    /// Request target including the query string.
    pub target: String,
    pub body: String,
}

impl RecordedRequest {
    /// The path portion of the target, without the query string.
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    /// The raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }
}

/// A canned response for requests matching a method and path prefix.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    method: String,
    prefix: String,
    status: u16,
    body: String,
    content_type: &'static str,
}

impl Route {
    pub fn new(method: &str, prefix: &str, status: u16, body: &str) -> Self {
        Self {
            method: method.to_string(),
            prefix: prefix.to_string(),
            status,
            body: body.to_string(),
            content_type: "application/json",
        }
    }

    pub fn json(method: &str, prefix: &str, body: &str) -> Self {
        Self::new(method, prefix, 200, body)
    }

    pub fn media(prefix: &str, body: &str) -> Self {
        Self {
            method: "GET".to_string(),
            prefix: prefix.to_string(),
            status: 200,
            body: body.to_string(),
            content_type: "application/octet-stream",
        }
    }
}

/// The stub server itself.
pub(crate) struct StubServer {
    addr: std::net::SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    /// Binds an ephemeral port and starts serving the given routes.
    pub async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    serve_connection(socket, routes, recorded).await;
                });
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    /// Base URL of the stub, e.g. `http://127.0.0.1:49152`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path starts with the given prefix.
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path().starts_with(prefix))
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(
    mut socket: tokio::net::TcpStream,
    routes: Vec<Route>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    // Read until the end of the headers.
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        if buf.len() > 64 * 1024 {
            return;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let request_line = headers.lines().next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let content_length = headers
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            if key.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    // Read the body.
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let Ok(n) = socket.read(&mut chunk).await else {
            break;
        };
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    let path = target.split('?').next().unwrap_or(&target).to_string();
    recorded.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        target: target.clone(),
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let (status, response_body, content_type) = routes
        .iter()
        .find(|r| r.method == method && path.starts_with(&r.prefix))
        .map(|r| (r.status, r.body.clone(), r.content_type))
        .unwrap_or((404, r#"{"error": "no stub route"}"#.to_string(), "application/json"));

    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "OK",
    };

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        content_type,
        response_body.len(),
        response_body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
