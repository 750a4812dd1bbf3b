// SPDX-License-Identifier: Apache-2.0

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

/// Retrieval links stay valid for a day, then the dashboard re-requests one.
pub const ATTACHMENT_URL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
pub struct StorageError(pub String);

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StorageError {}

pub const KEY_MAX_LEN: usize = 128;

/// Object keys are flat names built from validated ids; anything that could
/// smuggle path separators or query syntax into a signed URL is refused.
#[must_use]
pub fn is_valid_object_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= KEY_MAX_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

#[must_use]
pub fn id_card_photo_key(entity_id: &str, ext: &str) -> String {
    format!("{entity_id}-id-card-photo.{ext}")
}

#[must_use]
pub fn avatar_key(user_id: &str, ext: &str) -> String {
    format!("{user_id}-avatar.{ext}")
}

pub(crate) fn unix_now_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Decode a `data:image/...;base64,...` payload into an extension and raw
/// bytes. Anything else the browser might hand us is a caller error.
pub fn parse_image_data_uri(raw: &str) -> Result<(String, Vec<u8>), StorageError> {
    let rest = raw
        .strip_prefix("data:image/")
        .ok_or_else(|| StorageError("expected a data:image/... URI".to_string()))?;
    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| StorageError("expected a base64-encoded image data URI".to_string()))?;
    let ext = match subtype {
        "png" => "png",
        "jpeg" | "jpg" => "jpg",
        "webp" => "webp",
        other => {
            return Err(StorageError(format!("unsupported image type: {other}")));
        }
    };
    if payload.is_empty() {
        return Err(StorageError("image payload is empty".to_string()));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| StorageError(format!("image payload is not valid base64: {e}")))?;
    Ok((ext.to_string(), bytes))
}

/// HMAC-signed, expiring retrieval URLs in front of the external object
/// store. `signature` covers the key and the expiry instant.
pub struct UrlSigner {
    base_url: String,
    secret: Vec<u8>,
    ttl: Duration,
}

impl UrlSigner {
    #[must_use]
    pub fn new(base_url: &str, secret: &[u8], ttl: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: secret.to_vec(),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }

    pub fn presigned_url(&self, key: &str, now_unix: u64) -> Result<String, StorageError> {
        let expires = now_unix + self.ttl.as_secs();
        let signature = self.signature(key, expires)?;
        Ok(format!(
            "{}/{}?expires={}&signature={}",
            self.base_url,
            key.trim_start_matches('/'),
            expires,
            signature
        ))
    }

    pub fn verify(&self, key: &str, expires: u64, signature: &str, now_unix: u64) -> bool {
        if now_unix > expires {
            return false;
        }
        let Ok(expected) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret) else {
            return false;
        };
        mac.update(signing_input(key, expires).as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn signature(&self, key: &str, expires: u64) -> Result<String, StorageError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| StorageError(e.to_string()))?;
        mac.update(signing_input(key, expires).as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

fn signing_input(key: &str, expires: u64) -> String {
    format!("{key}\n{expires}")
}

pub trait ObjectStore: Send + Sync + 'static {
    fn put_object(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
    fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}

pub struct LocalFsObjectStore {
    pub root: PathBuf,
}

impl LocalFsObjectStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key.replace('/', "__"))
    }
}

impl ObjectStore for LocalFsObjectStore {
    fn put_object(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|e| StorageError(e.to_string()))?;
        fs::write(self.object_path(key), bytes).map_err(|e| StorageError(e.to_string()))
    }

    fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(key);
        if !path.exists() {
            return Err(StorageError(format!("object not found: {key}")));
        }
        fs::read(&path).map_err(|e| StorageError(e.to_string()))
    }
}
