//! Text encodings for keys and signatures: base64url without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{CoreError, Result};

/// Encode bytes as base64url without padding.
pub fn b64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a base64url (unpadded) string back to bytes.
pub fn b64url_decode(s: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| CoreError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let original = br#"{"hello":"world"}"#;
        let encoded = b64url_encode(original);
        let decoded = b64url_decode(&encoded).unwrap();
        assert_eq!(decoded, original);
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_public_key_length() {
        // A 32-byte key always encodes to 43 characters without padding
        let encoded = b64url_encode(&[0xabu8; 32]);
        assert_eq!(encoded.len(), 43);
    }

    #[test]
    fn test_url_safe_alphabet() {
        // 0xfb 0xff produces '+' '/' in standard base64; url-safe uses '-' '_'
        let encoded = b64url_encode(&[0xfb, 0xef, 0xff]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }

    #[test]
    fn test_reject_invalid() {
        assert!(b64url_decode("not base64url!!").is_err());
    }
}
