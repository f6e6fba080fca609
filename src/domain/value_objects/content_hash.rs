use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of an uploaded document's bytes, used to reject duplicate uploads
/// within one organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(hash: String) -> Result<Self, String> {
        if hash.len() != 64 {
            return Err("Hash must be 64 characters long (SHA-256)".to_string());
        }

        if !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("Hash must contain only hexadecimal characters".to_string());
        }

        Ok(Self(hash.to_lowercase()))
    }

    pub fn of(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        Self(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
