use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature-256 header")]
    Missing,

    #[error("signature header lacks the sha256= prefix")]
    BadPrefix,

    #[error("signature is not valid hex")]
    BadHex(#[from] hex::FromHexError),

    #[error("signature does not match payload")]
    Mismatch,
}

/// Check GitHub's `X-Hub-Signature-256` header against the raw body.
/// The comparison is constant-time.
pub fn verify(secret: &str, body: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let signature_hex = header
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::BadPrefix)?;
    let expected = hex::decode(signature_hex)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(body);
    mac.verify_slice(&expected).map_err(|_| SignatureError::Mismatch)
}

/// Compute the header value GitHub would send for `body`.
#[cfg(test)]
pub(crate) fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}
