//! caller supplied encoding of node data
//!
//! The tree never looks at the data of a node. Callers that want typed data pick
//! a [Payload] implementation to convert to and from bytes.
use derive_more::{Deref, DerefMut, From};
use serde::{de::DeserializeOwned, Serialize};

pub trait Payload: Sized {
    fn to_bytes(&self) -> anyhow::Result<Vec<u8>>;

    fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self>;
}

/// Raw bytes, passed through unchanged
impl Payload for Vec<u8> {
    fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(bytes.to_vec())
    }
}

/// Any serde type, stored as cbor
#[derive(Debug, Clone, PartialEq, Eq, Default, From, Deref, DerefMut)]
pub struct Cbor<T>(pub T);

impl<T: Serialize + DeserializeOwned> Payload for Cbor<T> {
    fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(&self.0)?)
    }

    fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(Self(serde_cbor::from_slice(bytes)?))
    }
}
