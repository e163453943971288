//! AI HTTP client service
//!
//! Thin typed wrappers around the remote text, vision and image endpoints

use crate::config::Settings;
use crate::models::ai::*;
use crate::models::Envelope;
use crate::utils::error::{AppError, AppResult};
use crate::utils::logging::summarize;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

const GENERATE_TEXT_FAILED: &str = "Failed to generate text";
const ANALYZE_IMAGE_FAILED: &str = "Failed to analyze image";
const CHECK_QUOTA_FAILED: &str = "Failed to check AI quota";
const GENERATE_IMAGE_FAILED: &str = "Failed to generate image";
const EDIT_IMAGE_FAILED: &str = "Failed to edit image";

/// AI API client
#[derive(Debug, Clone)]
pub struct AiClient {
    client: Client,
    settings: Settings,
}

impl AiClient {
    /// Create a new client instance
    pub fn new(settings: Settings) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("starterkit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, settings })
    }

    /// Generate text from a prompt
    pub async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> AppResult<TextGeneration> {
        let (project_id, api_url) = self.require_project()?;
        debug!("Generating text: {}", summarize(prompt, 80));

        let request = GenerateTextRequest {
            project_id: project_id.to_string(),
            prompt: prompt.to_string(),
            system_prompt: system_prompt.map(str::to_string),
        };

        let response = self
            .client
            .post(format!("{}/api/ai/generate", api_url))
            .json(&request)
            .send()
            .await?;

        self.handle_response(response, GENERATE_TEXT_FAILED).await
    }

    /// Analyze a base64 image, with or without a `data:` URL prefix
    pub async fn analyze_image(&self, image_base64: &str, prompt: &str) -> AppResult<ImageAnalysis> {
        let (project_id, _) = self.require_project()?;

        let request = VisionRequest {
            project_id: project_id.to_string(),
            prompt: prompt.to_string(),
            image_base64: Some(strip_data_url_prefix(image_base64).to_string()),
            image_url: None,
        };

        self.send_vision(request).await
    }

    /// Analyze raw image bytes
    pub async fn analyze_image_bytes(&self, image: &[u8], prompt: &str) -> AppResult<ImageAnalysis> {
        self.analyze_image(&BASE64.encode(image), prompt).await
    }

    /// Analyze an image the server can fetch itself
    pub async fn analyze_image_url(&self, image_url: &str, prompt: &str) -> AppResult<ImageAnalysis> {
        let (project_id, _) = self.require_project()?;

        let request = VisionRequest {
            project_id: project_id.to_string(),
            prompt: prompt.to_string(),
            image_base64: None,
            image_url: Some(image_url.to_string()),
        };

        self.send_vision(request).await
    }

    /// Remaining AI requests for the current period
    pub async fn check_ai_quota(&self) -> AppResult<QuotaInfo> {
        let (project_id, api_url) = self.require_project()?;
        debug!("Checking AI quota");

        let response = self
            .client
            .get(format!("{}/api/ai/usage", api_url))
            .query(&[("projectId", project_id)])
            .send()
            .await?;

        self.handle_response(response, CHECK_QUOTA_FAILED).await
    }

    /// Generate an image; defaults to 1:1 at 1K
    pub async fn generate_image(
        &self,
        prompt: &str,
        options: Option<ImageOptions>,
    ) -> AppResult<GeneratedImage> {
        self.send_image_request(prompt, None, options.unwrap_or_default(), GENERATE_IMAGE_FAILED)
            .await
    }

    /// Edit an existing base64 image according to `prompt`
    pub async fn edit_image(
        &self,
        image_base64: &str,
        prompt: &str,
        options: Option<ImageOptions>,
    ) -> AppResult<GeneratedImage> {
        let source = strip_data_url_prefix(image_base64).to_string();
        self.send_image_request(prompt, Some(source), options.unwrap_or_default(), EDIT_IMAGE_FAILED)
            .await
    }

    async fn send_vision(&self, request: VisionRequest) -> AppResult<ImageAnalysis> {
        let (_, api_url) = self.require_project()?;
        debug!("Analyzing image: {}", summarize(&request.prompt, 80));

        let response = self
            .client
            .post(format!("{}/api/ai/vision", api_url))
            .json(&request)
            .send()
            .await?;

        self.handle_response(response, ANALYZE_IMAGE_FAILED).await
    }

    async fn send_image_request(
        &self,
        prompt: &str,
        source_image_base64: Option<String>,
        options: ImageOptions,
        default_error: &str,
    ) -> AppResult<GeneratedImage> {
        let (project_id, api_url) = self.require_project()?;
        debug!(
            "Requesting image ({} at {:?}): {}",
            options.aspect_ratio.as_str(),
            options.resolution,
            summarize(prompt, 80)
        );

        let request = GenerateImageRequest {
            project_id: project_id.to_string(),
            prompt: prompt.to_string(),
            aspect_ratio: options.aspect_ratio,
            resolution: options.resolution,
            source_image_base64,
        };

        let response = self
            .client
            .post(format!("{}/api/ai/generate-image", api_url))
            .json(&request)
            .send()
            .await?;

        let payload: ImagePayload = self.handle_response(response, default_error).await?;
        Ok(GeneratedImage::from(payload))
    }

    /// Fail fast before any request when the project is not configured
    fn require_project(&self) -> AppResult<(&str, &str)> {
        let project_id = self
            .settings
            .project_id()
            .ok_or_else(|| AppError::Config("Project ID not configured".to_string()))?;
        let api_url = self
            .settings
            .api_url()
            .ok_or_else(|| AppError::Config("API URL not configured".to_string()))?;
        Ok((project_id, api_url))
    }

    /// Unwrap the response envelope
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        default_error: &str,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => envelope.into_data(default_error).map_err(|message| {
                error!("AI API error: {} ({})", message, status);
                AppError::Api(message)
            }),
            Err(e) if status.is_success() => {
                error!("Failed to parse AI response: {}", e);
                Err(AppError::Serialization(e))
            }
            Err(_) => {
                error!("AI API request failed: {} - {}", status, summarize(&body, 200));
                Err(AppError::Api(format!("{}: {}", default_error, status)))
            }
        }
    }
}
