use base64::{Engine as _, engine::general_purpose};
use derive_more::Display;
use std::fs;
use std::path::Path;
use uuid::Uuid;

const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Display, PartialEq)]
pub enum PhotoError {
    #[display(fmt = "Format foto tidak dikenali")]
    InvalidDataUrl,
    #[display(fmt = "Tipe gambar tidak didukung: {}", _0)]
    UnsupportedType(String),
    #[display(fmt = "Ukuran foto melebihi batas")]
    TooLarge,
    #[display(fmt = "Gagal menyimpan foto")]
    Io,
}

/// Decodes a webcam still submitted as a `data:image/...;base64,` URL and
/// writes it under `dir` with a uuid filename. Returns the stored filename.
pub fn store_data_url(data_url: &str, dir: &Path) -> Result<String, PhotoError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or(PhotoError::InvalidDataUrl)?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or(PhotoError::InvalidDataUrl)?;

    let ext = match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        other => return Err(PhotoError::UnsupportedType(other.to_string())),
    };

    let payload = payload.trim();

    // base64 expands by 4/3; checking the encoded length first keeps an
    // oversize body from ever being decoded
    if payload.len() > MAX_PHOTO_BYTES * 4 / 3 + 4 {
        return Err(PhotoError::TooLarge);
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| PhotoError::InvalidDataUrl)?;

    if bytes.is_empty() {
        return Err(PhotoError::InvalidDataUrl);
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(PhotoError::TooLarge);
    }

    fs::create_dir_all(dir).map_err(|e| {
        log::error!("Failed to create upload dir {:?}: {}", dir, e);
        PhotoError::Io
    })?;

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    fs::write(dir.join(&filename), &bytes).map_err(|e| {
        log::error!("Failed to write photo {}: {}", filename, e);
        PhotoError::Io
    })?;

    Ok(filename)
}

/// Removes a stored photo, e.g. when the record insert it belonged to was
/// rejected. Best effort.
pub fn discard(dir: &Path, filename: &str) {
    if let Err(e) = fs::remove_file(dir.join(filename)) {
        log::warn!("Failed to remove photo {}: {}", filename, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("presensi-test-{}", Uuid::new_v4()))
    }

    fn jpeg_data_url() -> String {
        let payload = general_purpose::STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]);
        format!("data:image/jpeg;base64,{}", payload)
    }

    #[test]
    fn stores_a_valid_data_url() {
        let dir = temp_dir();
        let filename = store_data_url(&jpeg_data_url(), &dir).unwrap();
        assert!(filename.ends_with(".jpg"));
        assert_eq!(fs::read(dir.join(&filename)).unwrap(), [0xFF, 0xD8, 0xFF, 0xE0]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rejects_payload_without_data_prefix() {
        let err = store_data_url("image/jpeg;base64,AAAA", &temp_dir()).unwrap_err();
        assert_eq!(err, PhotoError::InvalidDataUrl);
    }

    #[test]
    fn rejects_unsupported_media_type() {
        let err = store_data_url("data:application/pdf;base64,AAAA", &temp_dir()).unwrap_err();
        assert_eq!(err, PhotoError::UnsupportedType("application/pdf".to_string()));
    }

    #[test]
    fn rejects_oversize_payload_before_decoding() {
        // not valid base64, so a decode attempt would fail with
        // InvalidDataUrl; TooLarge proves the length check ran first
        let oversize = format!(
            "data:image/jpeg;base64,{}",
            "!".repeat(MAX_PHOTO_BYTES * 4 / 3 + 8)
        );
        let err = store_data_url(&oversize, &temp_dir()).unwrap_err();
        assert_eq!(err, PhotoError::TooLarge);
    }

    #[test]
    fn rejects_broken_base64() {
        let err = store_data_url("data:image/png;base64,!!!", &temp_dir()).unwrap_err();
        assert_eq!(err, PhotoError::InvalidDataUrl);
    }

    #[test]
    fn discard_removes_the_file() {
        let dir = temp_dir();
        let filename = store_data_url(&jpeg_data_url(), &dir).unwrap();
        discard(&dir, &filename);
        assert!(!dir.join(&filename).exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
