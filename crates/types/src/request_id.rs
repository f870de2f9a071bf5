use std::fmt;

/// Deterministic identifier of a consultation request.
///
/// A `RequestId` is the 32-byte digest of an ordered (requester, approver)
/// pair; see `medledger_core::derive_request_id` for the derivation. The
/// display form is 64 lowercase hex characters.
///
/// Swapping requester and approver yields a different identifier, so the two
/// directions of a pair never collide.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId([u8; 32]);

impl RequestId {
    /// Wraps a 32-byte digest.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the digest as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self)
    }
}

impl serde::Serialize for RequestId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_hex() {
        let id = RequestId::from_bytes([0xab; 32]);
        assert_eq!(id.to_string(), "ab".repeat(32));
        assert_eq!(id.to_hex().len(), 64);
    }

    #[test]
    fn equality_follows_bytes() {
        assert_eq!(
            RequestId::from_bytes([1; 32]),
            RequestId::from_bytes([1; 32])
        );
        assert_ne!(
            RequestId::from_bytes([1; 32]),
            RequestId::from_bytes([2; 32])
        );
    }
}
