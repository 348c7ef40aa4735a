pub mod config;
pub mod gemini;
pub mod mime;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod pipeline;

pub use config::{ConfigError, MorphConfig};
pub use gemini::{GeminiClient, GeminiError, InlineData};
pub use pipeline::{write_output, TransformJob, Transformer};
