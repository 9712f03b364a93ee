//! Signed session identifier codec
//!
//! Signs cookie values the same way as the Node.js `cookie-signature` library.
//! The format is: value + `.` + base64(hmac_sha256(value, secret)) with the
//! trailing `=` padding removed.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sign a value. Returns: value + `.` + base64_signature (without padding)
///
/// Signing is deterministic: the same value and secret always produce the
/// same output.
pub fn sign(value: &str, secret: &str) -> String {
    let signature = create_signature(value, secret);
    format!("{}.{}", value, signature)
}

/// Create HMAC-SHA256 signature in base64 format (no padding, to match Node.js)
fn create_signature(value: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(value.as_bytes());
    let result = mac.finalize();
    STANDARD
        .encode(result.into_bytes())
        .trim_end_matches('=')
        .to_string()
}

/// Verify a signed value and return the original value.
///
/// Returns `None` when the input has no signature or the signature does not
/// match. A mismatch is ordinary traffic (stale or forged cookies), so it is
/// never reported as an error.
pub fn unsign(signed_value: &str, secret: &str) -> Option<String> {
    // The value itself may contain dots; the signature never does
    let dot_pos = signed_value.rfind('.')?;
    let value = &signed_value[..dot_pos];
    let provided_signature = &signed_value[dot_pos + 1..];

    let expected_signature = create_signature(value, secret);

    if constant_time_compare(&expected_signature, provided_signature) {
        Some(value.to_string())
    } else {
        None
    }
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "12345678901234567890123456789012";

    #[test]
    fn test_sign_and_unsign() {
        let value = "test-session-id";

        let signed = sign(value, SECRET);
        assert!(signed.starts_with("test-session-id."));

        let unsigned = unsign(&signed, SECRET);
        assert_eq!(unsigned, Some(value.to_string()));
    }

    #[test]
    fn test_sign_is_deterministic() {
        assert_eq!(sign("abc", SECRET), sign("abc", SECRET));
        assert_ne!(sign("abc", SECRET), sign("abd", SECRET));
    }

    #[test]
    fn test_invalid_signature() {
        let signed = sign("test-session-id", SECRET);
        assert_eq!(unsign(&signed, "wrong secret"), None);
    }

    #[test]
    fn test_tampered_value_or_signature() {
        let signed = sign("test-session-id", SECRET);

        let tampered_value = signed.replacen("test", "fake", 1);
        assert_eq!(unsign(&tampered_value, SECRET), None);

        let mut tampered_sig = signed.clone();
        tampered_sig.pop();
        assert_eq!(unsign(&tampered_sig, SECRET), None);
    }

    #[test]
    fn test_garbage_input() {
        assert_eq!(unsign("", SECRET), None);
        assert_eq!(unsign("no-signature-here", SECRET), None);
        assert_eq!(unsign("value.", SECRET), None);
    }

    #[test]
    fn test_value_containing_dots() {
        let signed = sign("a.b.c", SECRET);
        assert_eq!(unsign(&signed, SECRET), Some("a.b.c".to_string()));
    }

    #[test]
    fn test_compatible_with_cookie_signature() {
        // From the cookie-signature README:
        // cookie.sign('hello', 'tobiiscool')
        let signed = sign("hello", "tobiiscool");
        assert_eq!(signed, "hello.DGDUkGlIkCzPz+C0B064FNgHdEjox7ch8tOBGslZ5QI");
        assert_eq!(unsign(&signed, "tobiiscool"), Some("hello".to_string()));
    }
}
