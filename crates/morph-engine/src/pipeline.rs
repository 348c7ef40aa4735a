use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use morph_contracts::prompts::{animate_prompt, simplify_prompt, vectorize_prompt, SIMPLIFY_ACTION};
use morph_contracts::strip_code_fences;

use crate::config::MorphConfig;
use crate::gemini::{GeminiClient, InlineData};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformJob {
    Animate { svg: String, action: String },
    Simplify { svg: String },
    Vectorize { image: InlineData },
}

impl TransformJob {
    /// Routes a free-form action: the literal `simplify` redraws the SVG,
    /// anything else is an animation request.
    pub fn from_action(action: &str, svg: String) -> Self {
        if action == SIMPLIFY_ACTION {
            TransformJob::Simplify { svg }
        } else {
            TransformJob::Animate {
                svg,
                action: action.to_string(),
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransformJob::Animate { .. } => "animate",
            TransformJob::Simplify { .. } => "simplify",
            TransformJob::Vectorize { .. } => "vectorize",
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            TransformJob::Animate { svg, action } => animate_prompt(action, svg),
            TransformJob::Simplify { svg } => simplify_prompt(svg),
            TransformJob::Vectorize { .. } => vectorize_prompt(),
        }
    }

    pub fn inline_data(&self) -> Option<&InlineData> {
        match self {
            TransformJob::Vectorize { image } => Some(image),
            _ => None,
        }
    }
}

/// Prompt builder, model client and fence sanitizer bound to one model and
/// credential.
#[derive(Debug, Clone)]
pub struct Transformer {
    client: GeminiClient,
    model: String,
    api_key: String,
}

impl Transformer {
    pub fn new(client: GeminiClient, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &MorphConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        let client = GeminiClient::new(&config.api_base)?;
        Ok(Self::new(client, config.model.clone(), api_key))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn run(&self, job: &TransformJob) -> Result<String> {
        let prompt = job.prompt();
        log::info!(
            "sending {} request to Gemini ({}), {} prompt bytes",
            job.name(),
            self.model,
            prompt.len()
        );
        let raw = self
            .client
            .generate_text(&self.model, &self.api_key, &prompt, job.inline_data())
            .with_context(|| format!("Gemini {} request failed ({})", job.name(), self.model))?;
        log::info!("received {} bytes from Gemini", raw.len());
        Ok(strip_code_fences(&raw))
    }
}

pub fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}
