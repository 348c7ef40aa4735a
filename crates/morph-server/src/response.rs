use anyhow::{anyhow, Result};
use tiny_http::{Header, Request, Response, StatusCode};

pub const JSON: &str = "application/json";
pub const PLAIN: &str = "text/plain; charset=utf-8";

pub fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|_| anyhow!("invalid header {key}: {value}"))
}
