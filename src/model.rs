use anyhow::{Context, Result, anyhow, bail};
use reqwest::Client;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::Config;
use crate::providers;

/// An uploaded picture sent alongside (or instead of) the text prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let mime_type = mime_type_for(path).ok_or_else(|| {
            anyhow!(
                "Unsupported image '{}'. Supported types: jpg, jpeg, png.",
                path.display()
            )
        })?;
        let data = fs::read(path)
            .with_context(|| format!("Failed to read image '{}'", path.display()))?;
        Ok(Self::new(mime_type, data))
    }
}

fn mime_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
}

impl GenerationRequest {
    pub fn is_empty(&self) -> bool {
        self.prompt.trim().is_empty() && self.image.is_none()
    }
}

pub async fn generate(client: &Client, cfg: &Config, request: &GenerationRequest) -> Result<String> {
    if request.is_empty() {
        bail!("Nothing to send: provide a question, an image, or both.");
    }

    let provider = cfg.model_provider.to_ascii_lowercase();

    match provider.as_str() {
        "gemini" => {
            debug!(
                provider = "gemini",
                model = %cfg.model,
                prompt_len = request.prompt.len(),
                has_image = request.image.is_some(),
                "dispatching generation request"
            );
            providers::gemini::generate(client, cfg, request).await
        }
        other => {
            warn!(provider = %other, "unsupported model provider configured");
            Err(anyhow!(
                "Unsupported MODEL_PROVIDER='{}'. Supported providers: gemini.",
                other
            ))
        }
    }
}
