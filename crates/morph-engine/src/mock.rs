//! Local stand-in for the Gemini `generateContent` endpoint.
//!
//! Serves a single canned response on an ephemeral loopback port and records
//! the request it answered.

use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::blocking::Client as HttpClient;
use serde_json::json;
use tiny_http::{Header, Response, Server, StatusCode};

use crate::gemini::GeminiClient;

const WAIT_FOR_REQUEST: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

pub struct MockGemini {
    base_url: String,
    handle: JoinHandle<Option<CapturedRequest>>,
}

impl MockGemini {
    pub fn serve(status: u16, body: impl Into<String>) -> Result<Self> {
        let body = body.into();
        let server = Server::http("127.0.0.1:0").map_err(|err| anyhow!("mock bind failed: {err}"))?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| anyhow!("mock server has no IP address"))?;

        let handle = thread::spawn(move || {
            let mut request = server.recv_timeout(WAIT_FOR_REQUEST).ok().flatten()?;
            let mut captured_body = String::new();
            request
                .as_reader()
                .read_to_string(&mut captured_body)
                .ok()?;
            let captured = CapturedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                body: captured_body,
            };
            let header = Header::from_bytes("Content-Type", "application/json").ok()?;
            let response = Response::from_string(body)
                .with_status_code(StatusCode(status))
                .with_header(header);
            request.respond(response).ok()?;
            Some(captured)
        });

        Ok(Self {
            base_url: format!("http://{addr}/v1beta"),
            handle,
        })
    }

    /// A 200 response whose first candidate carries `text`.
    pub fn reply_with_text(text: &str) -> Result<Self> {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        });
        Self::serve(200, body.to_string())
    }

    /// Client pointed at this mock that ignores proxy environment variables.
    pub fn client(&self) -> Result<GeminiClient> {
        let http = HttpClient::builder().no_proxy().build()?;
        Ok(GeminiClient::with_http_client(&self.base_url, http))
    }

    /// Waits for the serving thread and returns what it received, if anything.
    pub fn finish(self) -> Result<Option<CapturedRequest>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("mock server thread panicked"))
    }
}
