//! Integration tests for presigned uploads against a mock backend
//!
//! The mock server plays both roles: the signing backend and the bucket the
//! signed URLs point at.

use exportwatch::adapters::storage::StorageClient;
use exportwatch::config::{BackendConfig, UploadConfig};
use exportwatch::core::upload::{upload_file, UploadMethod};
use exportwatch::domain::{AppError, StorageError};
use mockito::Matcher;
use std::io::Write;
use tempfile::TempDir;

fn client(url: &str) -> StorageClient {
    StorageClient::new(BackendConfig {
        base_url: url.to_string(),
        ..Default::default()
    })
    .unwrap()
}

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents).unwrap();
    path
}

#[tokio::test]
async fn test_upload_file_with_put() {
    let mut server = mockito::Server::new_async().await;
    let bucket_url = format!("{}/bucket/reports/q1.pdf?X-Amz-Signature=abc", server.url());

    let sign = server
        .mock("GET", "/api/s3/presigned-url/put")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "reports/q1.pdf".into()),
            Matcher::UrlEncoded("contentType".into(), "application/pdf".into()),
            Matcher::UrlEncoded("fileSize".into(), "8".into()),
        ]))
        .with_status(200)
        .with_body(format!(r#"{{"url":"{bucket_url}","key":"reports/q1.pdf"}}"#))
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/bucket/reports/q1.pdf")
        .match_query(Matcher::UrlEncoded("X-Amz-Signature".into(), "abc".into()))
        .match_header("content-type", "application/pdf")
        .match_body("%PDF-1.7")
        .with_status(200)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "q1.pdf", b"%PDF-1.7");

    let outcome = upload_file(
        &client(&server.url()),
        &UploadConfig::default(),
        &path,
        Some("reports/q1.pdf".to_string()),
        UploadMethod::Put,
    )
    .await
    .unwrap();

    assert_eq!(outcome.key, "reports/q1.pdf");
    assert_eq!(outcome.size, 8);
    assert_eq!(outcome.content_type, "application/pdf");
    assert_eq!(outcome.method, UploadMethod::Put);
    sign.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_upload_file_with_post_and_default_key() {
    let mut server = mockito::Server::new_async().await;
    let bucket_url = format!("{}/bucket", server.url());

    let sign = server
        .mock("GET", "/api/s3/presigned-url/post")
        .match_query(Matcher::AllOf(vec![
            Matcher::Regex("key=uploads%2F[0-9]+-logo.png".into()),
            Matcher::UrlEncoded("contentType".into(), "image/png".into()),
        ]))
        .with_status(200)
        .with_body(format!(
            r#"{{"url":"{bucket_url}","fields":{{"policy":"eyJleHAi","x-amz-signature":"f00"}},"key":"uploads/logo.png"}}"#
        ))
        .create_async()
        .await;
    let post = server
        .mock("POST", "/bucket")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="policy""#.into()),
            Matcher::Regex(r#"name="x-amz-signature""#.into()),
            Matcher::Regex(r#"name="file"; filename="logo.png""#.into()),
        ]))
        .with_status(204)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "logo.png", &[0x89, b'P', b'N', b'G']);

    let outcome = upload_file(
        &client(&server.url()),
        &UploadConfig::default(),
        &path,
        None,
        UploadMethod::Post,
    )
    .await
    .unwrap();

    assert!(outcome.key.starts_with("uploads/"));
    assert!(outcome.key.ends_with("-logo.png"));
    assert_eq!(outcome.method, UploadMethod::Post);
    sign.assert_async().await;
    post.assert_async().await;
}

#[tokio::test]
async fn test_oversized_file_never_reaches_backend() {
    let mut server = mockito::Server::new_async().await;
    let sign = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "big.zip", &[0u8; 2048]);
    let config = UploadConfig {
        max_file_size_bytes: 1024,
        ..Default::default()
    };

    let err = upload_file(&client(&server.url()), &config, &path, None, UploadMethod::Put)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Storage(StorageError::FileTooLarge { .. })
    ));
    sign.assert_async().await;
}

#[tokio::test]
async fn test_disallowed_type_never_reaches_backend() {
    let mut server = mockito::Server::new_async().await;
    let sign = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "index.html", b"<html></html>");

    let err = upload_file(
        &client(&server.url()),
        &UploadConfig::default(),
        &path,
        None,
        UploadMethod::Put,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AppError::Storage(StorageError::ContentTypeNotAllowed(_))
    ));
    sign.assert_async().await;
}

#[tokio::test]
async fn test_expired_signature_fails_upload() {
    let mut server = mockito::Server::new_async().await;
    let bucket_url = format!("{}/bucket/a.png", server.url());
    let _sign = server
        .mock("GET", "/api/s3/presigned-url/put")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!(r#"{{"url":"{bucket_url}","key":"a.png"}}"#))
        .create_async()
        .await;
    let _put = server
        .mock("PUT", "/bucket/a.png")
        .with_status(403)
        .with_body("<Error><Code>AccessDenied</Code></Error>")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "a.png", b"png");

    let err = upload_file(
        &client(&server.url()),
        &UploadConfig::default(),
        &path,
        Some("a.png".to_string()),
        UploadMethod::Put,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        AppError::Storage(StorageError::UploadFailed { status: 403 })
    ));
}

#[tokio::test]
async fn test_upload_constraints_and_download_signing() {
    let mut server = mockito::Server::new_async().await;
    let _constraints = server
        .mock("GET", "/api/s3/upload-constraints")
        .with_status(200)
        .with_body(r#"{"maxFileSize":10485760,"allowedContentTypes":["image/png","application/pdf"]}"#)
        .create_async()
        .await;
    let _get = server
        .mock("GET", "/api/s3/presigned-url/get")
        .match_query(Matcher::UrlEncoded("key".into(), "exports/exp-1.csv.gz".into()))
        .with_status(200)
        .with_body(r#"{"url":"https://bucket.example.com/exports/exp-1.csv.gz?sig=9","key":"exports/exp-1.csv.gz"}"#)
        .create_async()
        .await;

    let storage = client(&server.url());

    let constraints = storage.upload_constraints().await.unwrap();
    assert_eq!(constraints.max_file_size, 10 * 1024 * 1024);
    assert_eq!(constraints.allowed_content_types.len(), 2);

    let signed = storage
        .presigned_get_url("exports/exp-1.csv.gz")
        .await
        .unwrap();
    assert_eq!(signed.key, "exports/exp-1.csv.gz");
    assert!(signed.url.ends_with("sig=9"));
}
