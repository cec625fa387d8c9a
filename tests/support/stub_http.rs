// ABOUTME: Minimal raw-TCP HTTP stubs standing in for the chat environments.
// ABOUTME: Serve canned responses for probes, the WS handshake, and the hook.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the stub should do with WebSocket upgrade requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsBehavior {
    Accept,
    Refuse,
}

/// A stub environment: answers 200 on every GET, optionally upgrades
/// WebSocket requests, and counts pre-shutdown POSTs.
pub struct StubEnvironment {
    address: String,
    pre_shutdown_hits: Arc<AtomicUsize>,
}

impl StubEnvironment {
    pub async fn spawn(ws: WsBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_task = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let hits = Arc::clone(&hits_task);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).to_string();
                    let lower = request.to_lowercase();

                    let response: &str = if lower.contains("upgrade: websocket") {
                        match ws {
                            WsBehavior::Accept => {
                                "HTTP/1.1 101 Switching Protocols\r\n\
                                 upgrade: websocket\r\nconnection: Upgrade\r\n\r\n"
                            }
                            WsBehavior::Refuse => {
                                "HTTP/1.1 403 Forbidden\r\ncontent-length: 0\r\n\r\n"
                            }
                        }
                    } else {
                        if request.starts_with("POST") && lower.contains("pre-shutdown") {
                            hits.fetch_add(1, Ordering::SeqCst);
                        }
                        "HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok"
                    };
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });

        Self {
            address,
            pre_shutdown_hits: hits,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn pre_shutdown_hits(&self) -> usize {
        self.pre_shutdown_hits.load(Ordering::SeqCst)
    }
}

/// An address with nothing listening on it.
pub async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);
    address
}
