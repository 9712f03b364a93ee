//! Session id generation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::SessionError;

/// Number of random bytes in a generated session id
pub const SESSION_ID_BYTES: usize = 18;

/// Source of new session ids
pub trait SessionIdGenerator: Send + Sync + 'static {
    /// Produce a fresh, unguessable session id
    fn generate(&self) -> Result<String, SessionError>;
}

/// Generates ids from the operating system CSPRNG.
///
/// Each id is 18 random bytes encoded as URL-safe base64 without padding,
/// giving a 24 character token.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl SessionIdGenerator for RandomIdGenerator {
    fn generate(&self) -> Result<String, SessionError> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| SessionError::IdGeneration(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_id_shape() {
        let id = RandomIdGenerator.generate().unwrap();
        assert_eq!(id.len(), 24);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<String> = (0..256)
            .map(|_| RandomIdGenerator.generate().unwrap())
            .collect();
        assert_eq!(ids.len(), 256);
    }
}
