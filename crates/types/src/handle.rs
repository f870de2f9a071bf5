use std::fmt;

/// Error type for document-handle validation.
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    /// The handle was empty or contained only whitespace.
    #[error("document handle cannot be empty")]
    Empty,
    /// The handle contained interior whitespace or control characters.
    #[error("document handle contains whitespace or control characters")]
    InvalidCharacters,
}

/// An opaque content-derived identifier produced by the content store.
///
/// The store owns the handle format (a hash-like token); this client only
/// guarantees the handle is a single non-empty token before recording it on
/// the ledger. Handles are immutable once created and never deleted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    /// Validates and wraps a content-store handle.
    ///
    /// Leading and trailing whitespace is trimmed. The trimmed token must be
    /// non-empty and free of interior whitespace and control characters.
    ///
    /// # Errors
    ///
    /// Returns [`HandleError`] if the input is empty or not a single token.
    pub fn new(input: impl AsRef<str>) -> Result<Self, HandleError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HandleError::Empty);
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(HandleError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for DocumentHandle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DocumentHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DocumentHandle::new(&s).map_err(serde::de::Error::custom)
    }
}
