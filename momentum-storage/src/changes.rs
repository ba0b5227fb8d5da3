//! State diffs.

use std::collections::btree_map::{self, BTreeMap};

use momentum_primitives::Hash;
use serde::{Deserialize, Serialize};

const TAG_PUT: u8 = 1;
const TAG_DELETE: u8 = 0;

/// Ordered set of key writes and deletions produced by one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    entries: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl Changes {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.entries.insert(key, Some(value));
    }

    #[inline]
    pub fn delete(&mut self, key: Vec<u8>) {
        self.entries.insert(key, None);
    }

    /// `None` when the key is untouched, `Some(None)` when it was deleted.
    pub fn get(&self, key: &[u8]) -> Option<Option<&[u8]>> {
        self.entries.get(key).map(|value| value.as_deref())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], Option<&[u8]>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_slice(), value.as_deref()))
    }

    /// Entries under `prefix`, in key order.
    pub(crate) fn range_prefix<'a>(
        &'a self,
        prefix: &'a [u8],
    ) -> impl Iterator<Item = (&'a Vec<u8>, &'a Option<Vec<u8>>)> + 'a {
        self.entries
            .range::<[u8], _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(prefix))
    }

    /// Layers `other` on top of `self`; later writes win.
    pub fn extend(&mut self, other: Changes) {
        self.entries.extend(other.entries);
    }

    /// Digest of the diff: every entry in key order with length-prefixed
    /// key and value and a put/delete tag.
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::new();
        for (key, value) in &self.entries {
            buf.extend_from_slice(&(key.len() as u32).to_be_bytes());
            buf.extend_from_slice(key);
            match value {
                Some(value) => {
                    buf.push(TAG_PUT);
                    buf.extend_from_slice(&(value.len() as u32).to_be_bytes());
                    buf.extend_from_slice(value);
                }
                None => buf.push(TAG_DELETE),
            }
        }
        Hash::digest(&buf)
    }
}

impl IntoIterator for Changes {
    type Item = (Vec<u8>, Option<Vec<u8>>);
    type IntoIter = btree_map::IntoIter<Vec<u8>, Option<Vec<u8>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
