// ABOUTME: Protocol-level smoke check: a WebSocket opening handshake.
// ABOUTME: Opens the session via HTTP Upgrade, then closes it by dropping the connection.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

// A fixed, valid Sec-WebSocket-Key (base64 of 16 bytes). The key only
// guards against misbehaving caches, so a constant is sufficient for a
// smoke probe.
const WS_KEY: &str = "Z2xhdWtvcy1zbW9rZS1vaw==";

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("connect to {address} failed: {reason}")]
    Connect { address: String, reason: String },

    #[error("http exchange failed: {0}")]
    Http(String),

    #[error("server did not switch protocols (status {0})")]
    NotUpgraded(u16),

    #[error("handshake timed out")]
    TimedOut,
}

/// Open a WebSocket session against `ws://{address}{path}` and close it
/// again. Succeeds iff the server answers `101 Switching Protocols`.
pub async fn ws_handshake(
    address: &str,
    path: &str,
    timeout: Duration,
) -> Result<(), HandshakeError> {
    let attempt = async {
        let stream = tokio::net::TcpStream::connect(address).await.map_err(|e| {
            HandshakeError::Connect {
                address: address.to_string(),
                reason: e.to_string(),
            }
        })?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| HandshakeError::Http(e.to_string()))?;

        tokio::spawn(async move {
            // with_upgrades keeps the connection alive through a 101.
            let _ = conn.with_upgrades().await;
        });

        let req = hyper::Request::builder()
            .method("GET")
            .uri(path)
            .header("host", address)
            .header("connection", "Upgrade")
            .header("upgrade", "websocket")
            .header("sec-websocket-version", "13")
            .header("sec-websocket-key", WS_KEY)
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| HandshakeError::Http(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| HandshakeError::Http(e.to_string()))?;

        if resp.status() != hyper::StatusCode::SWITCHING_PROTOCOLS {
            return Err(HandshakeError::NotUpgraded(resp.status().as_u16()));
        }

        // Session opened. Dropping the response and sender closes it;
        // the smoke check never exchanges frames.
        debug!(%address, %path, "websocket handshake accepted");
        Ok(())
    };

    match tokio::time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(HandshakeError::TimedOut),
    }
}
