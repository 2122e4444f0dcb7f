//! placement of entities in the key space
//!
//! A [KeyChain] describes where one entity of the hierarchy lives. All
//! relationships (parent, children, siblings, descendants) are computed from it,
//! nothing is stored besides the node itself.
//!
//! Rules:
//!
//! 1. the namespace of the children of a tree is the tree's namespace plus the tree's id
//! 2. the namespace of the children of a branch is the branch's namespace
//! 3. the location of an entity is its namespace plus its parent's id plus its own id
//!
//! From these it follows that
//!
//! - the parent is a tree iff the parent id is the last element of the namespace
//! - the siblings of an entity share the prefix namespace + parent id
//! - the descendants of a tree share the prefix namespace + id
//! - the children of a tree share the prefix namespace + id + id
//! - the children of a branch share the prefix namespace + id
//!
//! Since every id carries its height, two prefixes built from different ids never
//! overlap, so a prefix scan returns exactly the intended set.
//!
//! Trees may also be created below branches. The children of such a tree get the
//! branch's namespace extended by the tree's id, and all rules above still hold.
use crate::{
    error::{Error, Result},
    id::Id,
    location::Location,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Serialize, Deserialize)]
pub struct KeyChain {
    is_tree: bool,
    /// the ids to which parent id and id are appended to get the location
    namespace: Location,
    grand_parent_id: Id,
    parent_id: Id,
    id: Id,
}

impl KeyChain {
    /// The root entity. It lives at the empty key and is the parent of all forests.
    pub fn root() -> Self {
        Self {
            is_tree: true,
            namespace: Location::root(),
            grand_parent_id: Id::ROOT,
            parent_id: Id::ROOT,
            id: Id::ROOT,
        }
    }

    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    pub fn is_tree(&self) -> bool {
        self.is_tree
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn parent_id(&self) -> Id {
        self.parent_id
    }

    pub fn grand_parent_id(&self) -> Id {
        self.grand_parent_id
    }

    pub fn namespace(&self) -> &Location {
        &self.namespace
    }

    /// height of this entity in the hierarchy, 0 for the root
    pub fn height(&self) -> u64 {
        self.id.height()
    }

    /// true if the immediate parent starts a bucket of its own (a tree or the root)
    pub fn parent_is_tree(&self) -> bool {
        if self.is_root() {
            return true;
        }
        self.namespace.last() == Some(&self.parent_id)
    }

    pub fn loc(&self) -> Location {
        if self.is_root() {
            return Location::root();
        }
        self.namespace.appended(&[self.parent_id, self.id])
    }

    pub fn parent_loc(&self) -> Location {
        if self.is_root() || self.parent_id.is_root() {
            return Location::root();
        }
        if self.parent_is_tree() {
            // the parent id is the last namespace element, the grand parent goes before it
            let mut res = self.namespace.appended(&[self.parent_id]);
            let n = res.len();
            res.replace(n - 2, self.grand_parent_id);
            res
        } else {
            self.namespace.appended(&[self.grand_parent_id, self.parent_id])
        }
    }

    pub fn sibling_bucket(&self) -> Location {
        self.namespace.appended(&[self.parent_id])
    }

    pub fn child_bucket(&self) -> Location {
        if self.is_tree {
            self.namespace.appended(&[self.id, self.id])
        } else {
            self.namespace.appended(&[self.id])
        }
    }

    /// Prefix of all descendants of a tree. For a branch this covers just the children.
    pub fn descendant_bucket(&self) -> Location {
        self.namespace.appended(&[self.id])
    }

    fn child_namespace(&self) -> Location {
        if self.is_tree {
            self.namespace.appended(&[self.id])
        } else {
            self.namespace.clone()
        }
    }

    fn make_child(&self, is_tree: bool) -> Result<Self> {
        Ok(Self {
            is_tree,
            namespace: self.child_namespace(),
            grand_parent_id: self.parent_id,
            parent_id: self.id,
            id: self.id.make_child()?,
        })
    }

    pub fn make_child_branch(&self) -> Result<Self> {
        self.make_child(false)
    }

    pub fn make_child_tree(&self) -> Result<Self> {
        self.make_child(true)
    }

    /// A new entity of the same kind, with the same parent. The root has no siblings.
    pub fn make_sibling(&self) -> Result<Self> {
        if self.is_root() {
            return Err(Error::RootHasNoSiblings);
        }
        Ok(Self {
            id: self.parent_id.make_child()?,
            ..self.clone()
        })
    }

    pub fn key(&self) -> Vec<u8> {
        self.loc().key()
    }

    pub fn parent_key(&self) -> Vec<u8> {
        self.parent_loc().key()
    }

    pub fn child_key_prefix(&self) -> Vec<u8> {
        self.child_bucket().key()
    }

    pub fn sibling_key_prefix(&self) -> Vec<u8> {
        self.sibling_bucket().key()
    }

    pub fn descendant_key_prefix(&self) -> Vec<u8> {
        self.descendant_bucket().key()
    }
}

impl PartialEq for KeyChain {
    fn eq(&self, other: &Self) -> bool {
        self.loc() == other.loc()
    }
}

impl Eq for KeyChain {}

impl AsRef<KeyChain> for KeyChain {
    fn as_ref(&self) -> &KeyChain {
        self
    }
}

impl fmt::Debug for KeyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyChain")
            .field("kind", &if self.is_tree { "tree" } else { "branch" })
            .field("namespace", &self.namespace)
            .field("grand_parent_id", &self.grand_parent_id)
            .field("parent_id", &self.parent_id)
            .field("id", &self.id)
            .finish()
    }
}
