//! String-keyed hash trie with fan-out 4.
//!
//! Each level consumes the top two bits of the key's rolling hash to pick a
//! child, then shifts the hash left by two. Lookups walk from the root until
//! an equal key or an empty child is found. Nodes are never removed and the
//! trie is never rebalanced; colliding hashes just make a deeper chain.
//!
//! Node storage is charged to an [`Arena`] on insertion, so a map lives as
//! long as the arena budget that paid for it.

use smol_str::SmolStr;

use crate::arena::Arena;
use crate::constants::{HASH_MULTIPLIER, HASH_SEED};
use crate::text::Str;
use crate::Result;

const FANOUT: usize = 4;

pub trait TrieKey {
    fn key_bytes(&self) -> &[u8];
}

impl TrieKey for Str<'_> {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl TrieKey for &str {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl TrieKey for String {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl TrieKey for SmolStr {
    fn key_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

pub fn hash(bytes: &[u8]) -> u64 {
    bytes.iter().fold(HASH_SEED, |h, &byte| {
        (h ^ u64::from(byte)).wrapping_mul(HASH_MULTIPLIER)
    })
}

#[derive(Debug)]
struct Node<K, V> {
    children: [Option<usize>; FANOUT],
    key: K,
    value: V,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    Child { parent: usize, branch: usize },
}

enum Probe {
    Found(usize),
    Vacant(Slot),
}

#[derive(Debug)]
pub struct TrieMap<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Option<usize>,
    fallback: V,
}

impl<K: TrieKey, V> TrieMap<K, V> {
    pub fn new() -> Self
    where
        V: Default,
    {
        Self::with_fallback(V::default())
    }

    /// Creates an empty map whose misses resolve to `fallback`.
    pub fn with_fallback(fallback: V) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            fallback,
        }
    }

    fn probe(&self, key: &[u8]) -> Probe {
        let mut h = hash(key);
        let mut slot = Slot::Root;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.key.key_bytes() == key {
                return Probe::Found(idx);
            }
            let branch = (h >> 62) as usize;
            slot = Slot::Child {
                parent: idx,
                branch,
            };
            current = node.children[branch];
            h <<= 2;
        }
        Probe::Vacant(slot)
    }

    /// Looks `key` up without inserting. A miss yields the shared fallback
    /// slot, so the result can always be used.
    pub fn get(&self, key: &[u8]) -> &V {
        match self.probe(key) {
            Probe::Found(idx) => &self.nodes[idx].value,
            Probe::Vacant(_) => &self.fallback,
        }
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        match self.probe(key) {
            Probe::Found(idx) => Some(&mut self.nodes[idx].value),
            Probe::Vacant(_) => None,
        }
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        matches!(self.probe(key), Probe::Found(_))
    }

    /// Returns the slot for `key`, inserting a default-valued node when the
    /// key is new. Equal keys always resolve to the same node.
    pub fn get_or_insert(&mut self, key: K, arena: &mut Arena) -> Result<&mut V>
    where
        V: Default,
    {
        let idx = match self.probe(key.key_bytes()) {
            Probe::Found(idx) => idx,
            Probe::Vacant(slot) => {
                arena.reserve_array::<Node<K, V>>(1)?;
                let idx = self.nodes.len();
                self.nodes.push(Node {
                    children: [None; FANOUT],
                    key,
                    value: V::default(),
                });
                match slot {
                    Slot::Root => self.root = Some(idx),
                    Slot::Child { parent, branch } => {
                        self.nodes[parent].children[branch] = Some(idx);
                    }
                }
                idx
            }
        };
        Ok(&mut self.nodes[idx].value)
    }

    /// Number of nodes visited to reach `key`, if present.
    pub fn depth_of(&self, key: &[u8]) -> Option<usize> {
        let mut h = hash(key);
        let mut depth = 0;
        let mut current = self.root;
        while let Some(idx) = current {
            depth += 1;
            let node = &self.nodes[idx];
            if node.key.key_bytes() == key {
                return Some(depth);
            }
            current = node.children[(h >> 62) as usize];
            h <<= 2;
        }
        None
    }

    pub fn fallback(&self) -> &V {
        &self.fallback
    }

    pub fn set_fallback(&mut self, fallback: V) {
        self.fallback = fallback;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.nodes.iter().map(|node| (&node.key, &node.value))
    }
}

impl<K: TrieKey, V: Default> Default for TrieMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
