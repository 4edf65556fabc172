//! HTTP binding to the out-of-process inference sidecar.
//!
//! The sidecar owns the model weights and the accelerator; this client owns
//! nothing but the wire contract:
//!
//! - `GET  {base}/health` — readiness probe, any 2xx means ready
//! - `POST {base}/edit` — JSON body with a base64 PNG and the fixed edit
//!   parameters; JSON response with a base64 PNG back
//!
//! Images cross the boundary as PNG regardless of the upload's original
//! format — lossless, so the reproducibility contract survives the hop.

use super::backend::{EngineError, TransformBackend};
use super::params::EditParams;
use crate::preprocess;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a single edit may run. Diffusion at 50 steps on CPU is slow;
/// this is a backstop against a wedged sidecar, not a latency target.
const EDIT_TIMEOUT: Duration = Duration::from_secs(600);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct EditRequestBody<'a> {
    image: String,
    prompt: &'a str,
    negative_prompt: &'a str,
    true_cfg_scale: f32,
    num_inference_steps: u32,
    seed: u64,
}

#[derive(Deserialize)]
struct EditResponseBody {
    image: String,
}

/// JSON-over-HTTP client for the inference sidecar.
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl TransformBackend for RemoteBackend {
    async fn probe(&self) -> Result<(), EngineError> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| EngineError::Request(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(EngineError::Request(format!(
                "health check returned {}",
                response.status()
            )))
        }
    }

    async fn edit(&self, image: &RgbImage, params: &EditParams) -> Result<RgbImage, EngineError> {
        let png = preprocess::encode(image, ImageFormat::Png)
            .map_err(|e| EngineError::BadImage(e.to_string()))?;

        let body = EditRequestBody {
            image: BASE64.encode(&png),
            prompt: &params.instruction,
            negative_prompt: &params.negative_instruction,
            true_cfg_scale: params.guidance_scale,
            num_inference_steps: params.steps,
            seed: params.seed,
        };

        let response = self
            .client
            .post(self.endpoint("edit"))
            .timeout(EDIT_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::Request(format!(
                "edit returned {}",
                response.status()
            )));
        }

        let payload: EditResponseBody = response
            .json()
            .await
            .map_err(|e| EngineError::Request(e.to_string()))?;

        let bytes = BASE64
            .decode(&payload.image)
            .map_err(|e| EngineError::BadImage(e.to_string()))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| EngineError::BadImage(e.to_string()))?;
        Ok(decoded.into_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let backend = RemoteBackend::new("http://127.0.0.1:5100/");
        assert_eq!(backend.endpoint("edit"), "http://127.0.0.1:5100/edit");
        assert_eq!(backend.endpoint("health"), "http://127.0.0.1:5100/health");
    }

    #[tokio::test]
    async fn probe_against_closed_port_fails() {
        // Port 1 is essentially never listening.
        let backend = RemoteBackend::new("http://127.0.0.1:1");
        assert!(matches!(
            backend.probe().await,
            Err(EngineError::Request(_))
        ));
    }

    #[tokio::test]
    async fn edit_against_closed_port_fails_without_panicking() {
        let backend = RemoteBackend::new("http://127.0.0.1:1");
        let img = RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0]));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            backend.edit(&img, &EditParams::for_instruction("anything")),
        )
        .await
        .expect("connection refusal should be immediate");
        assert!(matches!(result, Err(EngineError::Request(_))));
    }
}
