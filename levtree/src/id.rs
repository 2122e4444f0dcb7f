//! namespace components
use crate::error::{Error, Result};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// number of random bytes in an identifier
pub const IDENTIFIER_LEN: usize = 16;

/// number of bytes of the height prefix
pub const HEIGHT_LEN: usize = 8;

/// encoded size of a single id
pub const ID_KEY_LEN: usize = HEIGHT_LEN + IDENTIFIER_LEN;

/// A namespace component: the height of the owning entity plus a random identifier.
///
/// The derived ordering is the same as the ordering of the encoded keys, since the
/// height is encoded big endian in front of the identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id {
    height: u64,
    identifier: [u8; IDENTIFIER_LEN],
}

impl Id {
    /// The id of the root entity. This is the only id with height 0.
    pub const ROOT: Id = Id {
        height: 0,
        identifier: [0u8; IDENTIFIER_LEN],
    };

    /// Create a fresh id at the given height, using the os entropy source
    pub fn new(height: u64) -> Result<Self> {
        let mut identifier = [0u8; IDENTIFIER_LEN];
        OsRng
            .try_fill_bytes(&mut identifier)
            .map_err(Error::IdGeneration)?;
        Ok(Self { height, identifier })
    }

    /// Assemble an id from its parts, e.g. when parsing keys
    pub fn from_parts(height: u64, identifier: [u8; IDENTIFIER_LEN]) -> Self {
        Self { height, identifier }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn identifier(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.identifier
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }

    /// fresh id one level below this one
    pub fn make_child(&self) -> Result<Self> {
        Self::new(self.height + 1)
    }

    /// fresh id on the same level as this one
    pub fn make_sibling(&self) -> Result<Self> {
        Self::new(self.height)
    }

    /// big endian height followed by the identifier bytes
    pub fn key(&self) -> [u8; ID_KEY_LEN] {
        let mut res = [0u8; ID_KEY_LEN];
        res[..HEIGHT_LEN].copy_from_slice(&self.height.to_be_bytes());
        res[HEIGHT_LEN..].copy_from_slice(&self.identifier);
        res
    }

    /// parse an id from the first [ID_KEY_LEN] bytes of a key
    pub fn read(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < ID_KEY_LEN {
            return None;
        }
        let mut height = [0u8; HEIGHT_LEN];
        height.copy_from_slice(&bytes[..HEIGHT_LEN]);
        let mut identifier = [0u8; IDENTIFIER_LEN];
        identifier.copy_from_slice(&bytes[HEIGHT_LEN..ID_KEY_LEN]);
        Some(Self {
            height: u64::from_be_bytes(height),
            identifier,
        })
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}:", self.height)?;
        for b in &self.identifier[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.height)?;
        for b in self.identifier.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
