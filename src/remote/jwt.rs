//! HS256 compact token signing for request payloads.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use crate::error::{OnboardError, OnboardResult};

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct JwtSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner").finish_non_exhaustive()
    }
}

impl JwtSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// `base64url(header).base64url(claims).base64url(hmac)`; the claims are the payload itself.
    pub fn sign(&self, claims: &Value) -> OnboardResult<String> {
        let header = json!({"alg": "HS256", "typ": "JWT"});
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?)
        );
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| OnboardError::Signing(format!("Invalid signing key: {}", e)))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Checks the signature and returns the claims.
    pub fn verify(&self, token: &str) -> OnboardResult<Value> {
        let (signing_input, signature) = token
            .rsplit_once('.')
            .ok_or_else(|| OnboardError::Signing("Token has no signature".to_string()))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| OnboardError::Signing(format!("Bad signature encoding: {}", e)))?;
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| OnboardError::Signing(format!("Invalid signing key: {}", e)))?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| OnboardError::Signing("Signature mismatch".to_string()))?;
        decode_claims(token)
    }
}

/// Decodes the claims segment without checking the signature.
pub fn decode_claims(token: &str) -> OnboardResult<Value> {
    let claims = token
        .split('.')
        .nth(1)
        .ok_or_else(|| OnboardError::Signing("Token has no claims segment".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(claims)
        .map_err(|e| OnboardError::Signing(format!("Bad claims encoding: {}", e)))?;
    Ok(serde_json::from_slice(&bytes)?)
}
