use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("export token is missing")]
    Missing,

    #[error("export token is malformed")]
    Malformed,

    #[error("export token does not match")]
    Mismatch,

    #[error("no export token is configured")]
    NotConfigured,
}

/// Checks a presented export token.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, presented: &str) -> Result<(), TokenError>;
}

/// Verifies against a single shared secret taken from configuration.
#[derive(Clone)]
pub struct StaticTokenVerifier {
    expected: Vec<u8>,
}

impl StaticTokenVerifier {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into().into_bytes(),
        }
    }
}

impl core::fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticTokenVerifier")
            .field("expected", &"<redacted>")
            .finish()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, presented: &str) -> Result<(), TokenError> {
        if self.expected.is_empty() {
            tracing::warn!("rejecting export request: no token configured");
            return Err(TokenError::NotConfigured);
        }

        let presented = presented.trim();
        if presented.is_empty() {
            return Err(TokenError::Missing);
        }
        if presented.chars().any(char::is_control) {
            return Err(TokenError::Malformed);
        }

        if constant_time_eq(presented.as_bytes(), &self.expected) {
            Ok(())
        } else {
            Err(TokenError::Mismatch)
        }
    }
}

/// Byte comparison whose running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
