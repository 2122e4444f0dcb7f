use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Id generation failed: {}", .0)]
    IdGeneration(rand::Error),

    #[error("Node encoding failed: {}", .0)]
    Encode(serde_cbor::Error),

    #[error("Node decoding failed: {}", .0)]
    Decode(serde_cbor::Error),

    #[error("Payload codec: {:#}", .0)]
    Payload(anyhow::Error),

    #[error("Store unavailable: {:#}", .0)]
    StoreUnavailable(anyhow::Error),

    #[error("Store io failure: {:#}", .0)]
    Io(anyhow::Error),

    #[error("Not found: {}", .key)]
    NotFound { key: HexKey },

    #[error("Batch write of {} nodes failed: {:#}", .count, .cause)]
    WriteFailure { count: usize, cause: anyhow::Error },

    #[error("Invalid config: {:#}", .0)]
    InvalidConfig(anyhow::Error),

    #[error("The root has no siblings")]
    RootHasNoSiblings,
}

impl Error {
    pub(crate) fn not_found(key: &[u8]) -> Self {
        Self::NotFound {
            key: HexKey(key.into()),
        }
    }

    /// true if this error is a lookup against a key with no entry
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A store key, displayed as hex
#[derive(Clone, PartialEq, Eq)]
pub struct HexKey(pub Box<[u8]>);

impl fmt::Display for HexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexKey({})", self)
    }
}
