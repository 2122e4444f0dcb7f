//! the unit of storage
use crate::{
    error::{Error, Result},
    keychain::KeyChain,
    payload::Payload,
};
use serde::{Deserialize, Serialize};

/// A keychain plus some opaque data.
///
/// Nodes do not reference their parents or children. All relationships are
/// recomputed from the keychain when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    keychain: KeyChain,
    data: Vec<u8>,
}

impl Node {
    pub fn new(keychain: KeyChain, data: impl Into<Vec<u8>>) -> Self {
        Self {
            keychain,
            data: data.into(),
        }
    }

    /// The root node, with no data
    pub fn root() -> Self {
        Self::new(KeyChain::root(), Vec::new())
    }

    pub fn keychain(&self) -> &KeyChain {
        &self.keychain
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) {
        self.data = data.into();
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// decode the data using a caller supplied payload codec
    pub fn decode_data<P: Payload>(&self) -> Result<P> {
        P::from_bytes(&self.data).map_err(Error::Payload)
    }

    /// encode a payload and replace the data with it
    pub fn encode_data<P: Payload>(&mut self, payload: &P) -> Result<()> {
        self.data = payload.to_bytes().map_err(Error::Payload)?;
        Ok(())
    }

    /// store key of this node
    pub fn key(&self) -> Vec<u8> {
        self.keychain.key()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serde_cbor::to_vec(self).map_err(Error::Encode)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        serde_cbor::from_slice(bytes).map_err(Error::Decode)
    }
}

impl AsRef<KeyChain> for Node {
    fn as_ref(&self) -> &KeyChain {
        &self.keychain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Cbor;

    fn sample() -> anyhow::Result<Node> {
        let forest = KeyChain::root().make_child_tree()?;
        let branch = forest.make_child_tree()?.make_child_branch()?;
        Ok(Node::new(branch, vec![1, 2, 3]))
    }

    #[test]
    fn key_is_location_key() -> anyhow::Result<()> {
        let node = sample()?;
        assert_eq!(node.key(), node.keychain().loc().key());
        assert!(Node::root().key().is_empty());
        Ok(())
    }

    #[test]
    fn serialize_roundtrip() -> anyhow::Result<()> {
        let node = sample()?;
        let bytes = node.serialize()?;
        let back = Node::deserialize(&bytes)?;
        assert_eq!(back, node);
        assert_eq!(back.keychain().namespace(), node.keychain().namespace());
        assert_eq!(back.keychain().parent_id(), node.keychain().parent_id());
        assert_eq!(
            back.keychain().grand_parent_id(),
            node.keychain().grand_parent_id()
        );
        assert_eq!(back.keychain().is_tree(), node.keychain().is_tree());
        assert_eq!(back.data(), node.data());
        Ok(())
    }

    #[test]
    fn deserialize_garbage() -> anyhow::Result<()> {
        let bytes = sample()?.serialize()?;
        let res = Node::deserialize(&bytes[..bytes.len() / 2]);
        assert!(matches!(res, Err(Error::Decode(_))));
        assert!(matches!(Node::deserialize(&[0xff, 0x00]), Err(Error::Decode(_))));
        Ok(())
    }

    #[test]
    fn typed_payload() -> anyhow::Result<()> {
        let mut node = sample()?;
        node.encode_data(&Cbor((42u64, "answer".to_string())))?;
        let Cbor((n, s)) = node.decode_data::<Cbor<(u64, String)>>()?;
        assert_eq!(n, 42);
        assert_eq!(s, "answer");
        assert!(node.decode_data::<Cbor<Vec<String>>>().is_err());
        Ok(())
    }

    #[quickcheck]
    fn roundtrip_any_data(data: Vec<u8>, tree: bool) -> anyhow::Result<bool> {
        let forest = KeyChain::root().make_child_tree()?;
        let kc = if tree {
            forest.make_child_tree()?
        } else {
            forest.make_child_branch()?
        };
        let node = Node::new(kc, data);
        let back = Node::deserialize(&node.serialize()?)?;
        Ok(back == node && back.data() == node.data())
    }
}
