use std::fmt;
use std::str::FromStr;

/// Error type for party-address parsing.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// The input did not contain exactly 40 hex characters after prefix
    /// stripping.
    #[error("party address must be 40 hex characters, got {0}")]
    Length(usize),
    /// The input contained characters outside `0-9a-fA-F`.
    #[error("party address contains non-hex characters")]
    NotHex,
}

/// A party handle: one per patient or doctor, immutable once created.
///
/// Internally this is the raw 20-byte identity. The canonical textual form is
/// `0x` followed by 40 lowercase hex characters, and that is the only form
/// this type ever produces.
///
/// # Construction
///
/// [`Address::parse`] accepts the relaxed forms seen in the wild (mixed case,
/// with or without the `0x` prefix) and normalises them, so two textual
/// representations of the same identity always compare, hash and derive
/// identically. Anything that is not 40 hex characters after prefix stripping
/// is rejected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Parses and normalises a party address.
    ///
    /// Leading/trailing whitespace and an optional `0x`/`0X` prefix are
    /// stripped; the remaining 40 hex characters are accepted in any case.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] if the input is not 40 hex characters after
    /// stripping.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let hex_part = input.trim();
        let hex_part = hex_part
            .strip_prefix("0x")
            .or_else(|| hex_part.strip_prefix("0X"))
            .unwrap_or(hex_part);

        if hex_part.len() != 40 {
            return Err(AddressError::Length(hex_part.len()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part.to_ascii_lowercase(), &mut bytes)
            .map_err(|_| AddressError::NotHex)?;
        Ok(Self(bytes))
    }

    /// Constructs an address from its raw 20 bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 20-byte identity.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "0xaaaa567890abcdef1234567890abcdef12345678";

    #[test]
    fn parse_canonical_form() {
        let addr = Address::parse(CANONICAL).unwrap();
        assert_eq!(addr.to_string(), CANONICAL);
    }

    #[test]
    fn parse_normalises_case_and_prefix() {
        let mixed = Address::parse("0xAAAA567890ABCDEF1234567890abcdef12345678").unwrap();
        let bare = Address::parse("aaaa567890abcdef1234567890abcdef12345678").unwrap();
        let padded = Address::parse("  0Xaaaa567890abcdef1234567890abcdef12345678 ").unwrap();

        let canonical = Address::parse(CANONICAL).unwrap();
        assert_eq!(mixed, canonical);
        assert_eq!(bare, canonical);
        assert_eq!(padded, canonical);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(matches!(
            Address::parse("0xabc"),
            Err(AddressError::Length(3))
        ));
        assert!(matches!(Address::parse(""), Err(AddressError::Length(0))));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let input = "0xzzzz567890abcdef1234567890abcdef12345678";
        assert!(matches!(Address::parse(input), Err(AddressError::NotHex)));
    }

    #[test]
    fn round_trips_through_serde() {
        let addr = Address::parse(CANONICAL).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", CANONICAL));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn bytes_round_trip() {
        let addr = Address::parse(CANONICAL).unwrap();
        assert_eq!(Address::from_bytes(*addr.as_bytes()), addr);
    }
}
