//! paths of ids and their byte keys
use crate::id::{Id, ID_KEY_LEN};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::{fmt, iter::FromIterator};

/// An ordered sequence of ids, from the root namespace down to some point.
///
/// The empty location denotes the root. Locations are plain values, appending
/// always produces a new location.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location(SmallVec<[Id; 4]>);

impl Location {
    /// the root location
    pub fn root() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[Id] {
        &self.0
    }

    /// The last id of the path, or the root id for the root location
    pub fn id(&self) -> Id {
        self.0.last().copied().unwrap_or(Id::ROOT)
    }

    /// last id, if any
    pub fn last(&self) -> Option<&Id> {
        self.0.last()
    }

    /// the concatenated keys of all ids
    pub fn key(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.0.len() * ID_KEY_LEN);
        self.key_into(&mut res);
        res
    }

    pub fn key_into(&self, target: &mut Vec<u8>) {
        for id in self.0.iter() {
            target.extend_from_slice(&id.key());
        }
    }

    /// A copy of this location with the given ids appended. Never touches self.
    pub fn appended(&self, ids: &[Id]) -> Self {
        let mut res = SmallVec::with_capacity(self.0.len() + ids.len());
        res.extend_from_slice(&self.0);
        res.extend_from_slice(ids);
        Self(res)
    }

    /// true if self is a prefix of other, as a sequence of ids
    pub fn is_prefix_of(&self, other: &Location) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Parse a key back into a location.
    ///
    /// Returns None if the key is not a sequence of whole ids.
    pub fn from_key(key: &[u8]) -> Option<Self> {
        if key.len() % ID_KEY_LEN != 0 {
            return None;
        }
        key.chunks(ID_KEY_LEN).map(Id::read).collect()
    }

    pub(crate) fn replace(&mut self, index: usize, id: Id) {
        self.0[index] = id;
    }
}

impl FromIterator<Id> for Location {
    fn from_iter<T: IntoIterator<Item = Id>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&[Id]> for Location {
    fn from(ids: &[Id]) -> Self {
        ids.iter().copied().collect()
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};

    impl Arbitrary for Location {
        fn arbitrary(g: &mut Gen) -> Self {
            let ids: Vec<Id> = Arbitrary::arbitrary(g);
            ids.into_iter().collect()
        }
    }

    fn path(n: usize) -> anyhow::Result<Location> {
        (1..=n as u64).map(Id::new).collect::<Result<_, _>>().map_err(Into::into)
    }

    #[test]
    fn root_location() {
        let root = Location::root();
        assert!(root.key().is_empty());
        assert_eq!(root.id(), Id::ROOT);
        assert_eq!(root, Location::from_key(&[]).unwrap());
    }

    #[test]
    fn id_is_last_element() -> anyhow::Result<()> {
        let l = path(3)?;
        assert_eq!(l.id(), l.ids()[2]);
        assert_eq!(l.id().height(), 3);
        Ok(())
    }

    #[test]
    fn appended_does_not_alias() -> anyhow::Result<()> {
        let base = path(2)?;
        let extra = Id::new(3)?;
        let mut a = base.appended(&[extra]);
        let b = base.appended(&[extra]);
        a.replace(0, Id::new(9)?);
        assert_eq!(base.len(), 2);
        assert_eq!(b.ids()[0], base.ids()[0]);
        assert_ne!(a.ids()[0], base.ids()[0]);
        assert_eq!(b.len(), 3);
        assert!(base.is_prefix_of(&b));
        assert!(!base.is_prefix_of(&a));
        Ok(())
    }

    #[test]
    fn prefix_key_is_byte_prefix() -> anyhow::Result<()> {
        let base = path(2)?;
        let longer = base.appended(&[Id::new(3)?, Id::new(4)?]);
        assert!(longer.key().starts_with(&base.key()));
        assert_eq!(longer.key().len(), 4 * ID_KEY_LEN);
        Ok(())
    }

    #[quickcheck]
    fn key_is_pure_function_of_ids(a: Location, b: Location) -> bool {
        (a == b) == (a.key() == b.key())
    }

    #[quickcheck]
    fn from_key_inverts_key(a: Location) -> bool {
        Location::from_key(&a.key()) == Some(a)
    }

    #[quickcheck]
    fn key_order_matches_location_order(a: Location, b: Location) -> bool {
        a.cmp(&b) == a.key().cmp(&b.key())
    }
}
