//! Request signing for the slash-command endpoint.
//!
//! The platform signs every request with HMAC-SHA256 over
//! `v0:{timestamp}:{body}` and sends `v0=<hex digest>` in the
//! `X-Slack-Signature` header, with the timestamp in
//! `X-Slack-Request-Timestamp`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::VerifyError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";
/// Header carrying the request timestamp (seconds since the epoch).
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

const VERSION: &str = "v0";

/// Verifies request signatures against a signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    max_skew: Duration,
}

impl SignatureVerifier {
    /// Creates a verifier that also rejects timestamps further than
    /// `max_skew` from the local clock.
    pub fn new(secret: impl Into<String>, max_skew: Duration) -> Self {
        Self {
            secret: secret.into(),
            max_skew,
        }
    }

    /// Verifies `signature` for `body` sent at `timestamp`, using the
    /// current time.
    pub fn verify(&self, timestamp: &str, signature: &str, body: &[u8]) -> Result<(), VerifyError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.verify_at(timestamp, signature, body, now)
    }

    /// Verifies against an explicit `now` (seconds since the epoch).
    pub fn verify_at(
        &self,
        timestamp: &str,
        signature: &str,
        body: &[u8],
        now: u64,
    ) -> Result<(), VerifyError> {
        let sent: u64 = timestamp
            .trim()
            .parse()
            .map_err(|_| VerifyError::InvalidTimestamp)?;
        let age = now.abs_diff(sent);
        if age > self.max_skew.as_secs() {
            return Err(VerifyError::StaleTimestamp { age });
        }

        let digest = signature
            .strip_prefix("v0=")
            .and_then(|hex_digest| hex::decode(hex_digest).ok())
            .ok_or(VerifyError::MalformedSignature)?;

        self.mac(timestamp, body)?
            .verify_slice(&digest)
            .map_err(|_| VerifyError::SignatureMismatch)
    }

    /// Computes the `v0=<hex>` signature for `body` sent at `timestamp`.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String, VerifyError> {
        let digest = self.mac(timestamp, body)?.finalize().into_bytes();
        Ok(format!("{VERSION}={}", hex::encode(digest)))
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256, VerifyError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .map_err(|_| VerifyError::InvalidSecret)?;
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        Ok(mac)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("max_skew", &self.max_skew)
            .finish_non_exhaustive()
    }
}
