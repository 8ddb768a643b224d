//! Binary object storage for product images

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::{ProductError, ProductResult};
use crate::models::ImageUpload;

/// Stores an image and returns its public URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> ProductResult<String>;
}

/// Posts images as multipart form data to an upload endpoint that answers
/// with `{"url": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpImageStore {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

impl HttpImageStore {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token,
        }
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    #[tracing::instrument(skip(self, image), fields(filename = %image.filename, size = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> ProductResult<String> {
        let part = Part::bytes(image.bytes)
            .file_name(image.filename)
            .mime_str(&image.content_type)?;
        let form = Form::new().part("file", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let body: UploadResponse = response.json().await?;
        Ok(body.url)
    }
}

/// Used when no upload endpoint is configured; every upload fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImageStore;

#[async_trait]
impl ImageStore for DisabledImageStore {
    async fn upload(&self, image: ImageUpload) -> ProductResult<String> {
        Err(ProductError::ImageUpload(format!(
            "image storage is not configured, dropping {}",
            image.filename
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_store_rejects_uploads() {
        let result = DisabledImageStore
            .upload(ImageUpload {
                filename: "okra.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                bytes: vec![0xFF, 0xD8],
            })
            .await;
        assert!(matches!(result, Err(ProductError::ImageUpload(_))));
    }
}
