//! Image URL presigner.
//!
//! Stored image references point at permanent object-storage locations.
//! Before they leave the API they are rewritten to short-lived signed
//! URLs: an HMAC-SHA256 over the canonical URL, date, and validity window,
//! appended as S3-style query parameters.
//!
//! Two hard requirements from the catalog contract:
//! - idempotent: a URL already bearing a signature token passes through
//!   unchanged;
//! - graceful: a signing failure is logged and the original unsigned
//!   reference returned - the request never fails because of signing.

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use url::Url;

/// Query parameter carrying the signature; its presence marks a URL as
/// already signed.
const SIGNATURE_PARAM: &str = "X-Amz-Signature";
const DATE_PARAM: &str = "X-Amz-Date";
const EXPIRES_PARAM: &str = "X-Amz-Expires";

/// Signed URL validity window in seconds.
pub const DEFAULT_TTL_SECS: u64 = 60;

/// Signs image URLs with a keyed hash and a validity window.
#[derive(Clone)]
pub struct ImageSigner {
    key: SecretString,
    ttl_secs: u64,
}

impl ImageSigner {
    /// Create a signer with the given key and validity window.
    #[must_use]
    pub const fn new(key: SecretString, ttl_secs: u64) -> Self {
        Self { key, ttl_secs }
    }

    /// Rewrite a stored image reference to a signed URL.
    ///
    /// Empty and already-signed references pass through unchanged; so does
    /// any reference that fails to sign.
    #[must_use]
    pub fn sign(&self, image_url: &str) -> String {
        if image_url.is_empty() || image_url.contains(SIGNATURE_PARAM) {
            return image_url.to_string();
        }

        match self.try_sign(image_url) {
            Ok(signed) => signed,
            Err(e) => {
                tracing::warn!(url = image_url, "failed to presign image URL: {e}");
                image_url.to_string()
            }
        }
    }

    /// Rewrite an optional image reference in place.
    pub fn sign_in_place(&self, image_url: &mut Option<String>) {
        if let Some(url) = image_url.as_deref() {
            *image_url = Some(self.sign(url));
        }
    }

    fn try_sign(&self, image_url: &str) -> Result<String, SignError> {
        let mut url = Url::parse(image_url)?;

        let date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let expires = self.ttl_secs.to_string();

        // Canonical string covers scheme, host, and path - the query
        // parameters being appended are part of the signature input.
        let canonical = format!(
            "{}://{}{}\n{date}\n{expires}",
            url.scheme(),
            url.host_str().ok_or(SignError::MissingHost)?,
            url.path()
        );

        let mut mac = Hmac::<Sha256>::new_from_slice(self.key.expose_secret().as_bytes())
            .map_err(|_| SignError::InvalidKey)?;
        mac.update(canonical.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        url.query_pairs_mut()
            .append_pair(DATE_PARAM, &date)
            .append_pair(EXPIRES_PARAM, &expires)
            .append_pair(SIGNATURE_PARAM, &signature);

        Ok(url.to_string())
    }
}

impl std::fmt::Debug for ImageSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSigner")
            .field("key", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
enum SignError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("URL has no host")]
    MissingHost,
    #[error("invalid signing key")]
    InvalidKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> ImageSigner {
        ImageSigner::new(
            SecretString::from("kJ8#mN2$pQ5&rT9!uW3@xZ6^aB0*cD4%"),
            DEFAULT_TTL_SECS,
        )
    }

    #[test]
    fn signs_a_plain_url() {
        let signed = signer().sign("https://storage.example.com/images/pan.jpg");
        assert!(signed.contains("X-Amz-Signature="));
        assert!(signed.contains("X-Amz-Expires=60"));
        assert!(signed.contains("X-Amz-Date="));
        assert!(signed.starts_with("https://storage.example.com/images/pan.jpg?"));
    }

    #[test]
    fn already_signed_url_passes_through_unchanged() {
        let url = "https://storage.example.com/images/pan.jpg?X-Amz-Date=20250101T000000Z&X-Amz-Signature=abc123";
        assert_eq!(signer().sign(url), url);
    }

    #[test]
    fn empty_reference_passes_through() {
        assert_eq!(signer().sign(""), "");
    }

    #[test]
    fn unparseable_reference_degrades_to_original() {
        let raw = "not a url at all";
        assert_eq!(signer().sign(raw), raw);
    }

    #[test]
    fn relative_reference_degrades_to_original() {
        let raw = "/images/pan.jpg";
        assert_eq!(signer().sign(raw), raw);
    }

    #[test]
    fn sign_in_place_rewrites_some_and_leaves_none() {
        let signer = signer();

        let mut some = Some("https://storage.example.com/a.jpg".to_string());
        signer.sign_in_place(&mut some);
        assert!(some.is_some_and(|u| u.contains("X-Amz-Signature=")));

        let mut none: Option<String> = None;
        signer.sign_in_place(&mut none);
        assert!(none.is_none());
    }

    #[test]
    fn debug_redacts_key() {
        let output = format!("{:?}", signer());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("kJ8#"));
    }
}
