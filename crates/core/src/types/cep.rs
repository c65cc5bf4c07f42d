//! Brazilian postal code (CEP) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Cep`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CepError {
    /// The input string is empty.
    #[error("CEP cannot be empty")]
    Empty,
    /// The input contains a character other than digits and one hyphen.
    #[error("CEP may contain only digits and an optional hyphen")]
    InvalidCharacter,
    /// The input does not contain exactly 8 digits.
    #[error("CEP must have exactly 8 digits, got {got}")]
    WrongLength {
        /// Number of digits found.
        got: usize,
    },
}

/// A Brazilian postal code.
///
/// Stored as its 8 digits; accepts `"01310100"` and `"01310-100"` on input
/// and always displays as `01310-100`.
///
/// ## Examples
///
/// ```
/// use helpnet_core::Cep;
///
/// let cep = Cep::parse("01310-100").unwrap();
/// assert_eq!(cep.as_str(), "01310100");
/// assert_eq!(cep.to_string(), "01310-100");
///
/// assert!(Cep::parse("1310100").is_err());   // 7 digits
/// assert!(Cep::parse("01310-10a").is_err()); // letter
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Cep(String);

impl Cep {
    /// Number of digits in a CEP.
    pub const DIGITS: usize = 8;

    /// Parse a `Cep` from a string, with or without the conventional hyphen.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits and hyphens, or does not have exactly 8 digits.
    pub fn parse(s: &str) -> Result<Self, CepError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(CepError::Empty);
        }

        if s.chars().any(|c| !c.is_ascii_digit() && c != '-') {
            return Err(CepError::InvalidCharacter);
        }

        let digits: String = s.chars().filter(char::is_ascii_digit).collect();

        if digits.len() != Self::DIGITS {
            return Err(CepError::WrongLength { got: digits.len() });
        }

        Ok(Self(digits))
    }

    /// Returns the 8 digits without the hyphen (the wire form used by
    /// lookup services).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Cep` and returns the digit string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cep {
    /// Formats as `00000-000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, suffix) = self.0.split_at(5);
        write!(f, "{prefix}-{suffix}")
    }
}

impl std::str::FromStr for Cep {
    type Err = CepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Cep {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Cep {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Cep {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Cep {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_hyphen() {
        let plain = Cep::parse("01310100").unwrap();
        let hyphenated = Cep::parse("01310-100").unwrap();
        assert_eq!(plain, hyphenated);
        assert_eq!(plain.as_str(), "01310100");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let cep = Cep::parse("  01310-100 ").unwrap();
        assert_eq!(cep.as_str(), "01310100");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Cep::parse(""), Err(CepError::Empty));
        assert_eq!(Cep::parse("  "), Err(CepError::Empty));
    }

    #[test]
    fn test_parse_rejects_letters() {
        assert_eq!(Cep::parse("01310-10a"), Err(CepError::InvalidCharacter));
        assert_eq!(Cep::parse("abcdefgh"), Err(CepError::InvalidCharacter));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(Cep::parse("1310100"), Err(CepError::WrongLength { got: 7 }));
        assert_eq!(
            Cep::parse("013101000"),
            Err(CepError::WrongLength { got: 9 })
        );
    }

    #[test]
    fn test_display_inserts_hyphen() {
        let cep = Cep::parse("01310100").unwrap();
        assert_eq!(cep.to_string(), "01310-100");
    }

    #[test]
    fn test_serde_roundtrip() {
        let cep = Cep::parse("01310-100").unwrap();
        let json = serde_json::to_string(&cep).unwrap();
        assert_eq!(json, "\"01310100\"");

        let parsed: Cep = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cep);
    }
}
