//! Webhook authenticity check.
//!
//! The gateway signs each callback body with HMAC-SHA256 under a shared
//! secret and sends the hex digest in [`SIGNATURE_HEADER`]. Unsigned or
//! wrongly signed deliveries never reach the reconciliation engine.

use crate::config::WebhookSecret;
use crate::error::{PaymentError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-callback-signature";

/// Verifies callback signatures with a pre-keyed HMAC.
#[derive(Clone)]
pub struct SignatureVerifier {
    keyed: HmacSha256,
}

impl SignatureVerifier {
    pub fn new(secret: &WebhookSecret) -> Result<Self> {
        let keyed = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
            .map_err(|e| PaymentError::Configuration(format!("unusable webhook secret: {e}")))?;
        Ok(Self { keyed })
    }

    /// Hex-encoded HMAC-SHA256 of `payload`.
    pub fn sign(&self, payload: &[u8]) -> String {
        hex::encode(self.mac(payload).finalize().into_bytes())
    }

    /// Constant-time check of a hex signature against `payload`.
    pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        self.mac(payload).verify_slice(&expected).is_ok()
    }

    fn mac(&self, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(payload);
        mac
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignatureVerifier([REDACTED])")
    }
}
