//! Base image generation through the OpenAI Images API

use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::constants::{GENERATED_IMAGE_SIZE, OPENAI_IMAGES_URL};
use crate::error::CampaignError;

/// Request body for POST /v1/images/generations
/// Docs: https://platform.openai.com/docs/api-reference/images
#[derive(Serialize, Debug)]
struct ImagesGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'a str>,

    // GPT image models only.
    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<&'a str>,

    // dall-e models only.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a str>,
}

impl<'a> ImagesGenerateRequest<'a> {
    fn for_model(model: &'a str, prompt: &'a str) -> Self {
        if model.starts_with("gpt-image") {
            Self {
                model,
                prompt,
                n: 1,
                size: GENERATED_IMAGE_SIZE,
                quality: Some("high"),
                output_format: Some("png"),
                response_format: None,
            }
        } else if model == "dall-e-3" {
            Self {
                model,
                prompt,
                n: 1,
                size: GENERATED_IMAGE_SIZE,
                quality: Some("standard"),
                output_format: None,
                response_format: Some("b64_json"),
            }
        } else {
            Self {
                model,
                prompt,
                n: 1,
                size: GENERATED_IMAGE_SIZE,
                quality: None,
                output_format: None,
                response_format: Some("b64_json"),
            }
        }
    }
}

#[derive(Deserialize, Debug)]
struct ImagesGenerateResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    b64_json: Option<String>,
    url: Option<String>,
    revised_prompt: Option<String>,
}

/// Where base images come from when a product has none on disk.
#[derive(Clone)]
pub enum ImageGenerator {
    /// Calls the OpenAI Images API.
    OpenAi {
        /// shared HTTP client
        client: reqwest::Client,
        /// bearer token
        api_key: String,
        /// image model, eg `dall-e-3`
        model: String,
    },
    /// Generation is turned off, every request fails.
    Disabled,
}

impl std::fmt::Debug for ImageGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi { model, .. } => f
                .debug_struct("OpenAi")
                .field("model", model)
                .finish_non_exhaustive(),
            Self::Disabled => write!(f, "Disabled"),
        }
    }
}

impl ImageGenerator {
    /// OpenAI when a key is configured, otherwise disabled.
    pub fn from_api_key(api_key: Option<String>, model: &str) -> Self {
        match api_key.filter(|key| !key.trim().is_empty()) {
            Some(api_key) => Self::OpenAi {
                client: reqwest::Client::new(),
                api_key,
                model: model.to_string(),
            },
            None => Self::Disabled,
        }
    }

    /// Submits `prompt` and returns the encoded image body.
    #[instrument(level = "info", skip(self))]
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>, CampaignError> {
        let (client, api_key, model) = match self {
            Self::OpenAi {
                client,
                api_key,
                model,
            } => (client, api_key, model),
            Self::Disabled => {
                return Err(CampaignError::Generation(
                    "Image generation is disabled, set OPENAI_API_KEY".to_string(),
                ));
            }
        };

        let req_body = ImagesGenerateRequest::for_model(model, prompt);
        let resp = client
            .post(OPENAI_IMAGES_URL)
            .bearer_auth(api_key)
            .json(&req_body)
            .send()
            .await?;

        let status = resp.status();
        let resp_bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(CampaignError::Generation(format!(
                "OpenAI Images API error {status}: {}",
                String::from_utf8_lossy(&resp_bytes)
            )));
        }

        let parsed: ImagesGenerateResponse = serde_json::from_slice(&resp_bytes).map_err(|err| {
            CampaignError::Generation(format!("Failed to parse images response: {err}"))
        })?;
        let first = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| CampaignError::Generation("No image data returned".to_string()))?;

        if let Some(revised_prompt) = first.revised_prompt {
            info!("Revised prompt from OpenAI: {revised_prompt}");
        }

        if let Some(b64_json) = first.b64_json {
            general_purpose::STANDARD.decode(b64_json).map_err(|err| {
                CampaignError::Generation(format!("Failed to base64-decode image: {err}"))
            })
        } else if let Some(url) = first.url {
            debug!("Downloading generated image");
            let resp = client.get(url).send().await?;
            let status = resp.status();
            let bytes = resp.bytes().await?;
            if !status.is_success() {
                return Err(CampaignError::Generation(format!(
                    "Image download error {status}"
                )));
            }
            Ok(bytes.to_vec())
        } else {
            Err(CampaignError::Generation(
                "Image response missing b64_json and url fields".to_string(),
            ))
        }
    }
}

/// Prompt for a product shot aimed at `audience`.
pub fn product_prompt(product_name: &str, audience: &str) -> String {
    format!(
        "Professional product photography of {} for {}, clean background, high quality, commercial style",
        product_name.replace('_', " "),
        audience
    )
}
