//! Local HTTP/1.1 responder for exercising the client against real sockets

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned answer for one request
pub struct StubResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl StubResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    fn encode(&self) -> String {
        let mut raw = format!("HTTP/1.1 {} Stub\r\n", self.status);
        raw.push_str("Content-Type: application/json\r\n");
        for (name, value) in &self.headers {
            raw.push_str(&format!("{}: {}\r\n", name, value));
        }
        raw.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        raw.push_str("Connection: close\r\n\r\n");
        raw.push_str(&self.body);
        raw
    }
}

/// Serves every connection on 127.0.0.1 with `respond(request_target)`
pub struct StubServer {
    pub base_url: String,
    targets: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let targets = Arc::new(Mutex::new(Vec::new()));
        let respond = Arc::new(respond);

        let seen = Arc::clone(&targets);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let respond = Arc::clone(&respond);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move { serve(stream, respond.as_ref(), &seen).await });
            }
        });

        Self {
            base_url: format!("http://{}", address),
            targets,
        }
    }

    /// Request targets (path and query) received so far
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

async fn serve<F>(mut stream: TcpStream, respond: &F, seen: &Mutex<Vec<String>>) -> Option<()>
where
    F: Fn(&str) -> StubResponse,
{
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        request.extend_from_slice(&buf[..n]);
    }

    let head = String::from_utf8_lossy(&request);
    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let response = respond(&target);
    seen.lock().unwrap().push(target);

    stream.write_all(response.encode().as_bytes()).await.ok()?;
    let _ = stream.shutdown().await;
    Some(())
}
