//! Presigned storage client
//!
//! Asks the backend to sign storage operations, then talks to the storage
//! endpoint directly with the signed URL.

use super::models::{PresignedPostResponse, PresignedUrlResponse, StoredFile, UploadConstraints};
use crate::adapters::http::BackendHttp;
use crate::config::BackendConfig;
use crate::domain::{ApiError, Result, StorageError};
use reqwest::multipart::{Form, Part};
use reqwest::Response;

/// Client for the presigned URL endpoints under `backend.storage_path`
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: BackendHttp,
}

impl StorageClient {
    /// Create a new storage client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self> {
        Ok(Self {
            http: BackendHttp::new(config)?,
        })
    }

    fn url(&self, path: &str) -> String {
        self.http.url(&self.http.config().storage_path, path)
    }

    /// Signs a PUT upload of `file_size` bytes
    pub async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        file_size: u64,
    ) -> std::result::Result<PresignedUrlResponse, ApiError> {
        let size = file_size.to_string();
        let request = self.http.get(&self.url("presigned-url/put")).query(&[
            ("key", key),
            ("contentType", content_type),
            ("fileSize", size.as_str()),
        ]);
        self.http.send_json(request).await
    }

    /// Signs a form POST upload
    pub async fn presigned_post_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> std::result::Result<PresignedPostResponse, ApiError> {
        let request = self
            .http
            .get(&self.url("presigned-url/post"))
            .query(&[("key", key), ("contentType", content_type)]);
        self.http.send_json(request).await
    }

    /// Signs a GET download
    pub async fn presigned_get_url(
        &self,
        key: &str,
    ) -> std::result::Result<PresignedUrlResponse, ApiError> {
        let request = self
            .http
            .get(&self.url("presigned-url/get"))
            .query(&[("key", key)]);
        self.http.send_json(request).await
    }

    /// Lists uploaded objects
    pub async fn list_files(&self) -> std::result::Result<Vec<StoredFile>, ApiError> {
        self.http.send_json(self.http.get(&self.url("files"))).await
    }

    /// Upload limits advertised by the backend
    pub async fn upload_constraints(&self) -> std::result::Result<UploadConstraints, ApiError> {
        self.http
            .send_json(self.http.get(&self.url("upload-constraints")))
            .await
    }

    /// Uploads bytes straight to a presigned PUT URL
    pub async fn upload_with_put(
        &self,
        url: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<(), StorageError> {
        let response = self
            .http
            .client()
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Api(ApiError::transport(e.to_string())))?;

        check_upload(response)
    }

    /// Uploads bytes with a presigned form POST
    pub async fn upload_with_post(
        &self,
        presigned: &PresignedPostResponse,
        body: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> std::result::Result<(), StorageError> {
        let mut form = Form::new();
        for (name, value) in &presigned.fields {
            form = form.text(name.clone(), value.clone());
        }

        let part = Part::bytes(body)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::ContentTypeNotAllowed(format!("{content_type}: {e}")))?;
        form = form.part("file", part);

        let response = self
            .http
            .client()
            .post(&presigned.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Api(ApiError::transport(e.to_string())))?;

        check_upload(response)
    }
}

fn check_upload(response: Response) -> std::result::Result<(), StorageError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Direct upload to storage failed");
        return Err(StorageError::UploadFailed {
            status: status.as_u16(),
        });
    }
    Ok(())
}
