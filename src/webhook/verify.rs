//! Webhook signature verification
//!
//! The provider signs the raw request body with HMAC-SHA512 under the
//! shared secret and sends the digest as lower-hex in the
//! `x-paystack-signature` header. Verification recomputes the MAC over
//! the exact bytes received and compares in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use thiserror::Error;

use crate::escrow::error::MarketError;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the hex-encoded body signature
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Authentication failures, ordered by when they are detected.
///
/// A missing or malformed signature is a bad request (the sender never
/// authenticated); only an actual digest mismatch is an auth failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    #[error("webhook secret not configured")]
    SecretNotConfigured,

    #[error("signature header absent")]
    MissingHeader,

    #[error("signature is not valid hex")]
    MalformedHeader,

    #[error("digest mismatch")]
    Mismatch,
}

impl SignatureError {
    pub fn http_status(&self) -> u16 {
        match self {
            SignatureError::Mismatch => 401,
            _ => 400,
        }
    }
}

impl From<SignatureError> for MarketError {
    fn from(e: SignatureError) -> Self {
        MarketError::SignatureInvalid(match e {
            SignatureError::SecretNotConfigured => "secret not configured",
            SignatureError::MissingHeader => "signature header absent",
            SignatureError::MalformedHeader => "signature is not valid hex",
            SignatureError::Mismatch => "digest mismatch",
        })
    }
}

/// Verify a webhook body against its signature header.
///
/// Rejects when the secret is unconfigured, the header is absent, the
/// header is not valid hex, or the digest does not match. Only after
/// this returns Ok may the body be parsed.
pub fn check_signature(
    secret: Option<&str>,
    signature_header: Option<&str>,
    body: &[u8],
) -> Result<(), SignatureError> {
    let secret = match secret {
        Some(s) if !s.is_empty() => s,
        _ => return Err(SignatureError::SecretNotConfigured),
    };
    let signature = match signature_header {
        Some(s) if !s.is_empty() => s,
        _ => return Err(SignatureError::MissingHeader),
    };

    let supplied = hex::decode(signature).map_err(|_| SignatureError::MalformedHeader)?;

    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::SecretNotConfigured)?;
    mac.update(body);

    // verify_slice compares in constant time
    mac.verify_slice(&supplied)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compute the lower-hex signature for a body, as the provider would.
/// Compiled for tests and the dev mock feature only.
#[cfg(any(test, feature = "mock-provider"))]
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "sk_test_0123456789abcdef";
    const BODY: &[u8] = br#"{"event":"charge.success","data":{"reference":"ref_1"}}"#;

    #[test]
    fn test_valid_signature_accepted() {
        let sig = sign_body(SECRET, BODY);
        assert!(check_signature(Some(SECRET), Some(&sig), BODY).is_ok());
    }

    #[test]
    fn test_signature_is_lower_hex() {
        let sig = sign_body(SECRET, BODY);
        assert_eq!(sig.len(), 128); // SHA-512 digest, hex encoded
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_missing_secret_rejected_as_bad_request() {
        let sig = sign_body(SECRET, BODY);
        let err = check_signature(None, Some(&sig), BODY).unwrap_err();
        assert_eq!(err, SignatureError::SecretNotConfigured);
        assert_eq!(err.http_status(), 400);

        let err = check_signature(Some(""), Some(&sig), BODY).unwrap_err();
        assert_eq!(err, SignatureError::SecretNotConfigured);
    }

    #[test]
    fn test_missing_header_rejected_as_bad_request() {
        let err = check_signature(Some(SECRET), None, BODY).unwrap_err();
        assert_eq!(err, SignatureError::MissingHeader);
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_non_hex_header_rejected_as_bad_request() {
        let err = check_signature(Some(SECRET), Some("not-hex!"), BODY).unwrap_err();
        assert_eq!(err, SignatureError::MalformedHeader);
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_wrong_secret_rejected_as_unauthorized() {
        let sig = sign_body("sk_test_other", BODY);
        let err = check_signature(Some(SECRET), Some(&sig), BODY).unwrap_err();
        assert_eq!(err, SignatureError::Mismatch);
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn test_every_single_byte_mutation_rejected() {
        let sig = sign_body(SECRET, BODY);
        for i in 0..BODY.len() {
            let mut tampered = BODY.to_vec();
            tampered[i] ^= 0x01;
            assert_eq!(
                check_signature(Some(SECRET), Some(&sig), &tampered),
                Err(SignatureError::Mismatch),
                "mutation at byte {} must invalidate the signature",
                i
            );
        }
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let sig = sign_body(SECRET, BODY);
        let truncated = &sig[..sig.len() - 2];
        assert!(check_signature(Some(SECRET), Some(truncated), BODY).is_err());
    }

    #[test]
    fn test_uppercase_hex_of_valid_digest_still_matches() {
        // hex decoding is case-insensitive; the digest bytes are what count
        let sig = sign_body(SECRET, BODY).to_uppercase();
        assert!(check_signature(Some(SECRET), Some(&sig), BODY).is_ok());
    }

    #[test]
    fn test_taxonomy_conversion() {
        let err: MarketError = SignatureError::Mismatch.into();
        assert_eq!(err.code(), "SIGNATURE_INVALID");
        assert_eq!(err.http_status(), 401);
    }
}
