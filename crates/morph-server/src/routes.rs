use std::io::Read;
use std::path::PathBuf;

use anyhow::Result;
use morph_contracts::{TransformRequest, TransformResponse};
use morph_engine::{ConfigError, MorphConfig, TransformJob, Transformer};
use tiny_http::{Method, Request};

use crate::response::{send_body, JSON};
use crate::static_files;

pub const TRANSFORM_PATH: &str = "/api/transform";

const METHOD_NOT_ALLOWED: &str = "Method not allowed";
const INVALID_BODY: &str = "Invalid request body";
const MISSING_API_KEY: &str = "GEMINI_API_KEY not set";
const TRANSFORM_FAILED: &str = "Failed to transform SVG: Model error or timeout";

/// Read-only state shared by every request thread.
#[derive(Debug)]
pub struct AppState {
    pub transformer: Option<Transformer>,
    pub static_dir: PathBuf,
}

impl AppState {
    /// A missing credential keeps the server up; transform requests then
    /// answer with an error envelope.
    pub fn from_config(config: &MorphConfig) -> Result<Self> {
        let transformer = match Transformer::from_config(config) {
            Ok(transformer) => Some(transformer),
            Err(err) if err.downcast_ref::<ConfigError>().is_some() => {
                log::warn!("{err}; /api/transform will reject requests");
                None
            }
            Err(err) => return Err(err),
        };
        Ok(Self {
            transformer,
            static_dir: config.static_dir.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteReply {
    pub status: u16,
    pub body: TransformResponse,
}

impl RouteReply {
    fn ok(result: String) -> Self {
        Self {
            status: 200,
            body: TransformResponse::success(result),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: TransformResponse::failure(message),
        }
    }
}

pub fn handle_transform(method: &Method, body: &[u8], transformer: Option<&Transformer>) -> RouteReply {
    if *method != Method::Post {
        return RouteReply::error(405, METHOD_NOT_ALLOWED);
    }

    let request: TransformRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(err) => {
            log::error!("error decoding transform request: {err}");
            return RouteReply::error(500, INVALID_BODY);
        }
    };
    log::info!(
        "transform request: action={:?}, svg size={} bytes",
        request.action,
        request.svg.len()
    );

    let Some(transformer) = transformer else {
        log::error!("transform request rejected: {MISSING_API_KEY}");
        return RouteReply::error(500, MISSING_API_KEY);
    };

    let job = TransformJob::Animate {
        svg: request.svg,
        action: request.action,
    };
    match transformer.run(&job) {
        Ok(svg) => {
            log::info!(
                "transform succeeded with {}, result size={} bytes",
                transformer.model(),
                svg.len()
            );
            RouteReply::ok(svg)
        }
        Err(err) => {
            log::error!("error calling Gemini: {err:#}");
            RouteReply::error(500, TRANSFORM_FAILED)
        }
    }
}

/// Reads the whole body before routing it; a body that cannot be read is
/// rejected like one that cannot be decoded.
pub fn transform_from_reader(
    method: &Method,
    reader: &mut dyn Read,
    transformer: Option<&Transformer>,
) -> RouteReply {
    let mut body = Vec::new();
    if let Err(err) = reader.read_to_end(&mut body) {
        log::error!("error reading request body: {err}");
        return RouteReply::error(500, INVALID_BODY);
    }
    handle_transform(method, &body, transformer)
}

pub fn handle_request(mut request: Request, state: &AppState) -> Result<()> {
    let path = request.url().split('?').next().unwrap_or_default().to_string();
    if path != TRANSFORM_PATH {
        return static_files::respond(request, &state.static_dir);
    }

    let method = request.method().clone();
    let reply = transform_from_reader(&method, request.as_reader(), state.transformer.as_ref());
    let payload = serde_json::to_vec(&reply.body)?;
    send_body(request, reply.status, JSON, payload)
}
