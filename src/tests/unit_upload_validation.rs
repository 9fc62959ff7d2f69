use crate::config::FotonsConfig;
use crate::error::UploadError;
use crate::storage::{
    object_key, sanitize_file_name, sniff_mime_type, upload_many, HttpImageUploader, ImagePayload,
    ImageUploader, IMAGES_FOLDER, MAX_IMAGE_BYTES,
};
use crate::tests::support::MockUploader;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn png(name: &str) -> ImagePayload {
    ImagePayload::new(name, "image/png", PNG_MAGIC.to_vec())
}

// test that only image mime types get through
#[test]
fn test_non_image_is_rejected() {
    let payload = ImagePayload::new("a.txt", "text/plain", b"oi".to_vec());
    assert!(matches!(payload.validate(), Err(UploadError::NotAnImage(mime)) if mime == "text/plain"));
}

// the limit is inclusive: exactly 5MB is fine, one byte more is not
#[test]
fn test_size_limit() {
    let at_limit = ImagePayload::new("a.png", "image/png", vec![0; MAX_IMAGE_BYTES]);
    assert!(at_limit.validate().is_ok());

    let over = ImagePayload::new("a.png", "image/png", vec![0; MAX_IMAGE_BYTES + 1]);
    assert!(matches!(over.validate(), Err(UploadError::TooLarge(n)) if n == MAX_IMAGE_BYTES + 1));
}

#[test]
fn test_object_keys() {
    assert_eq!(sanitize_file_name("minha foto (1).JPG"), "minha_foto__1_.JPG");
    assert_eq!(sanitize_file_name("ção.png"), "__o.png");
    assert_eq!(object_key("/images/", "a b.png", 1700), "images/1700-a_b.png");
}

// the mime type comes from the bytes, not the extension
#[test]
fn test_mime_is_sniffed_from_content() {
    assert_eq!(sniff_mime_type(&PNG_MAGIC), "image/png");
    assert_eq!(sniff_mime_type(b"plain text"), "application/octet-stream");

    let dir = tempdir().unwrap();
    let path = dir.path().join("disfarçado.txt");
    std::fs::write(&path, PNG_MAGIC).unwrap();

    let payload = ImagePayload::from_path(&path).unwrap();
    assert_eq!(payload.mime_type, "image/png");
    assert_eq!(payload.file_name, "disfarçado.txt");
    assert!(payload.validate().is_ok());
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(ImagePayload::from_path(&PathBuf::from("/nao/existe.png")).is_err());
}

// batches upload in order and stop at the first bad file
#[tokio::test]
async fn test_upload_many_stops_at_first_failure() {
    let uploader = MockUploader::new();

    let urls = upload_many(&uploader, &[png("a.png"), png("b.png")], IMAGES_FOLDER)
        .await
        .unwrap();
    assert_eq!(
        urls,
        vec![
            "https://cdn.test/photonslib/images/0-a.png".to_string(),
            "https://cdn.test/photonslib/images/0-b.png".to_string(),
        ]
    );

    let bad = ImagePayload::new("c.pdf", "application/pdf", vec![1]);
    let result = upload_many(&uploader, &[png("d.png"), bad, png("e.png")], IMAGES_FOLDER).await;
    assert!(matches!(result, Err(UploadError::NotAnImage(_))));
    // d went up, e never did
    assert_eq!(uploader.uploaded.lock().unwrap().len(), 3);
}

// without storage settings the real uploader fails before any request
#[tokio::test]
async fn test_unconfigured_uploader() {
    let config = FotonsConfig {
        api_url: "http://localhost:3000".to_string(),
        storage_url: String::new(),
        storage_public_url: String::new(),
        storage_bucket: "photonslib".to_string(),
        storage_key: String::new(),
        autosave_debounce: Duration::from_millis(1000),
        session_file: PathBuf::from("session.json"),
        request_timeout: Duration::from_secs(5),
    };
    assert!(!config.storage_configured());

    let uploader = HttpImageUploader::from_config(&config);
    let result = uploader.upload(&png("a.png"), IMAGES_FOLDER).await;
    assert!(matches!(result, Err(UploadError::NotConfigured)));
}

#[test]
fn test_public_object_url() {
    let uploader = HttpImageUploader::new(
        "https://store.test/storage/v1".to_string(),
        "https://cdn.test/".to_string(),
        "photonslib".to_string(),
        "key".to_string(),
    );
    assert_eq!(
        uploader.public_object_url("images/1-a.png"),
        "https://cdn.test/photonslib/images/1-a.png"
    );
}
