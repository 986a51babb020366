//! Pairing code value object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest pairing code accepted from a user or a broker.
pub const MAX_PAIRING_CODE_LEN: usize = 64;

/// Reasons a string is not a usable pairing code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairingCodeError {
    #[error("pairing code is empty")]
    Empty,

    #[error("pairing code is {len} characters long, the maximum is {max}")]
    TooLong { len: usize, max: usize },

    /// The code ends up in a URL path, so only `[A-Za-z0-9_-]` is allowed.
    #[error("pairing code contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Short opaque string identifying a rendezvous slot at the broker.
///
/// Immutable: a session that needs a different code must resolve a new one
/// and start over.
///
/// # Examples
///
/// ```rust
/// use proxy_core::PairingCode;
///
/// let code: PairingCode = "pair-007".parse().unwrap();
/// assert_eq!(code.as_str(), "pair-007");
/// assert!("has space".parse::<PairingCode>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairingCode(String);

impl PairingCode {
    /// Validates and wraps `code`.  Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`PairingCodeError`] if the trimmed code is empty, too long or
    /// contains a character outside `[A-Za-z0-9_-]`.
    pub fn new(code: impl AsRef<str>) -> Result<Self, PairingCodeError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(PairingCodeError::Empty);
        }
        let len = code.chars().count();
        if len > MAX_PAIRING_CODE_LEN {
            return Err(PairingCodeError::TooLong {
                len,
                max: MAX_PAIRING_CODE_LEN,
            });
        }
        if let Some(bad) = code
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(PairingCodeError::InvalidCharacter(bad));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PairingCode {
    type Err = PairingCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PairingCode {
    type Error = PairingCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PairingCode> for String {
    fn from(code: PairingCode) -> Self {
        code.0
    }
}

impl AsRef<str> for PairingCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code_is_accepted() {
        let code = PairingCode::new("ABC").unwrap();
        assert_eq!(code.as_str(), "ABC");
        assert_eq!(code.to_string(), "ABC");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(PairingCode::new("  K7QP2M\n").unwrap().as_str(), "K7QP2M");
    }

    #[test]
    fn test_empty_code_is_rejected() {
        assert_eq!(PairingCode::new(""), Err(PairingCodeError::Empty));
        assert_eq!(PairingCode::new("   "), Err(PairingCodeError::Empty));
    }

    #[test]
    fn test_code_with_slash_is_rejected() {
        assert_eq!(
            PairingCode::new("a/b"),
            Err(PairingCodeError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn test_overlong_code_is_rejected() {
        let long = "x".repeat(MAX_PAIRING_CODE_LEN + 1);
        assert_eq!(
            PairingCode::new(&long),
            Err(PairingCodeError::TooLong {
                len: MAX_PAIRING_CODE_LEN + 1,
                max: MAX_PAIRING_CODE_LEN
            })
        );
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let code = PairingCode::new("pair-007").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), r#""pair-007""#);
        let back: PairingCode = serde_json::from_str(r#""pair-007""#).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<PairingCode>(r#""""#).is_err());
    }
}
