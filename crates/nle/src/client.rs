//! Thin client for the local job server. The panel only needs three things
//! from it directly: liveness, a session token, and authenticated calls
//! with the panel headers attached.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("job server request failed: {0}")]
    Http(String),
    #[error("job server reply malformed: {0}")]
    BadReply(String),
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    token: String,
}

pub struct JobServerClient {
    base_url: String,
    agent: ureq::Agent,
}

impl JobServerClient {
    pub fn new(port: u16) -> Self {
        Self::with_base_url(format!("http://127.0.0.1:{port}"))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(1500))
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            base_url: base_url.into(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Quick liveness check, bounded tighter than ordinary calls.
    pub fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self
            .agent
            .get(&url)
            .timeout(Duration::from_millis(1000))
            .call()
        {
            Ok(resp) => resp.status() == 200,
            Err(_) => false,
        }
    }

    /// Mint a session token for subsequent authenticated calls.
    pub fn fetch_token(&self) -> Result<String, ClientError> {
        let url = format!("{}/auth/token", self.base_url);
        let resp = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let body = resp
            .into_string()
            .map_err(|e| ClientError::BadReply(e.to_string()))?;
        let reply: TokenReply =
            serde_json::from_str(&body).map_err(|e| ClientError::BadReply(e.to_string()))?;
        Ok(reply.token)
    }

    /// Authenticated GET returning the raw body.
    pub fn get(&self, path: &str, token: &str) -> Result<String, ClientError> {
        let url = format!("{}{path}", self.base_url);
        self.agent
            .get(&url)
            .set("Authorization", &format!("Bearer {token}"))
            .set("X-CEP-Panel", "true")
            .call()
            .map_err(|e| ClientError::Http(e.to_string()))?
            .into_string()
            .map_err(|e| ClientError::BadReply(e.to_string()))
    }

    /// Authenticated JSON POST returning the raw body.
    pub fn post(&self, path: &str, token: &str, body: &str) -> Result<String, ClientError> {
        let url = format!("{}{path}", self.base_url);
        self.agent
            .post(&url)
            .set("Authorization", &format!("Bearer {token}"))
            .set("X-CEP-Panel", "true")
            .set("Content-Type", "application/json")
            .send_string(body)
            .map_err(|e| ClientError::Http(e.to_string()))?
            .into_string()
            .map_err(|e| ClientError::BadReply(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    /// One-connection server that records the request head and replies with
    /// a fixed body.
    fn one_shot(body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_len = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_len = v.trim().parse().unwrap_or(0);
                }
                if line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let mut payload = vec![0u8; content_len];
            reader.read_exact(&mut payload).unwrap();
            let mut stream = reader.into_inner();
            stream
                .write_all(
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    )
                    .as_bytes(),
                )
                .unwrap();
            head
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn token_fetch_parses_reply() {
        let (base, handle) = one_shot(r#"{"token": "tok-123"}"#);
        let client = JobServerClient::with_base_url(base);
        assert_eq!(client.fetch_token().unwrap(), "tok-123");
        let head = handle.join().unwrap();
        assert!(head.starts_with("GET /auth/token"));
    }

    #[test]
    fn authed_calls_carry_panel_headers() {
        let (base, handle) = one_shot(r#"{"jobs": []}"#);
        let client = JobServerClient::with_base_url(base);
        client.get("/jobs", "tok-123").unwrap();
        let head = handle.join().unwrap();
        assert!(head.contains("Authorization: Bearer tok-123"));
        assert!(head.contains("X-CEP-Panel: true"));
    }

    #[test]
    fn dead_server_is_just_unhealthy() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = JobServerClient::new(port);
        assert!(!client.health());
        assert!(client.fetch_token().is_err());
    }
}
