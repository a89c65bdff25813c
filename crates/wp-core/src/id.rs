//! # Document Identifiers
//!
//! Identifiers are 12-byte object ids rendered as 24 hex characters,
//! the key format of the document store. Parsing happens at the boundary
//! so a malformed id never reaches a store call.

use crate::error::{AppError, AppResult};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const ID_BYTES: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh id: 4 bytes of creation time followed by 8 random bytes
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        let secs = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self(hex::encode(bytes))
    }

    /// Parse a caller-supplied id
    pub fn parse(raw: &str) -> AppResult<Self> {
        let bytes = hex::decode(raw)
            .map_err(|_| AppError::InvalidArgument(format!("malformed identifier: {raw}")))?;
        if bytes.len() != ID_BYTES {
            return Err(AppError::InvalidArgument(format!(
                "malformed identifier: {raw}"
            )));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DocumentId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_parse() {
        let id = DocumentId::generate();
        assert_eq!(id.as_str().len(), 24);
        assert_eq!(DocumentId::parse(id.as_str()).unwrap(), id);
        assert_ne!(DocumentId::generate(), id);
    }

    #[test]
    fn test_malformed_ids_rejected() {
        for raw in ["", "abc", "not-an-object-id-at-all!", "64b7f0c2a1b2c3d4e5f6071", "zzb7f0c2a1b2c3d4e5f60718"] {
            let err = DocumentId::parse(raw).unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument(_)), "{raw}");
        }
    }

    #[test]
    fn test_uppercase_normalized() {
        let id = DocumentId::parse("64B7F0C2A1B2C3D4E5F60718").unwrap();
        assert_eq!(id.as_str(), "64b7f0c2a1b2c3d4e5f60718");
    }
}
