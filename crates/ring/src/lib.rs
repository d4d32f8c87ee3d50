//! Consistent-hash ring (CHR): a pure function from counter key to the
//! store node responsible for it.
//!
//! The ring itself holds no network state and makes no I/O calls — it is a
//! sorted collection of virtual points and a binary search. Both the queue
//! service and the gateway build one from the same `STORE_NODES` list and
//! must therefore agree on every key's owner.

use md5::{Digest, Md5};

/// Default number of virtual points per physical node.
pub const DEFAULT_REPLICAS: usize = 100;

/// A consistent-hash ring over a set of node identifiers (in this system,
/// store node base URLs).
///
/// Internally this is a `Vec<(u128, String)>` sorted by hash value rather
/// than a `BTreeMap`, for two reasons: lookups vastly outnumber membership
/// changes in this workload, and ties between equal hash values must
/// resolve by insertion order, which falls out for free from a stable sort
/// on a flat vector.
#[derive(Debug, Clone)]
pub struct HashRing {
    points: Vec<(u128, String)>,
    replicas: usize,
}

impl HashRing {
    /// Create an empty ring that will place `replicas` virtual points per
    /// node added to it.
    pub fn new(replicas: usize) -> Self {
        Self {
            points: Vec::new(),
            replicas,
        }
    }

    /// Build a ring populated with every node's virtual points up front.
    pub fn build<I, S>(nodes: I, replicas: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ring = Self::new(replicas);
        for node in nodes {
            ring.add(node.as_ref());
        }
        ring
    }

    /// Insert all `replicas` virtual points for `node`. The sorted sequence
    /// remains sorted afterwards.
    pub fn add(&mut self, node: &str) {
        for i in 0..self.replicas {
            self.points.push((virtual_point_hash(node, i), node.to_string()));
        }
        // `sort_by_key` is a stable sort, so nodes added earlier keep their
        // relative position among any colliding hash values.
        self.points.sort_by_key(|(hash, _)| *hash);
    }

    /// Remove all virtual points for `node`. A no-op if `node` was never
    /// added.
    pub fn remove(&mut self, node: &str) {
        self.points.retain(|(_, n)| n != node);
    }

    /// Return the node responsible for `key`, or `None` if the ring holds
    /// no nodes.
    ///
    /// The owner is the node of the smallest virtual point strictly greater
    /// than `hash(key)`, wrapping to the first point when no such point
    /// exists.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let key_hash = md5_u128(key.as_bytes());
        let idx = self.points.partition_point(|(hash, _)| *hash <= key_hash);
        let idx = if idx == self.points.len() { 0 } else { idx };
        Some(self.points[idx].1.as_str())
    }

    /// True if the ring holds no virtual points (i.e. no nodes).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total number of virtual points currently on the ring.
    pub fn virtual_point_count(&self) -> usize {
        self.points.len()
    }
}

fn virtual_point_hash(node: &str, replica_index: usize) -> u128 {
    md5_u128(format!("{node}-{replica_index}").as_bytes())
}

/// The 128-bit integer derived from MD5 of `bytes`, matching Python's
/// `int(hashlib.md5(x).hexdigest(), 16)` (big-endian interpretation of the
/// digest bytes).
fn md5_u128(bytes: &[u8]) -> u128 {
    let digest = Md5::digest(bytes);
    u128::from_be_bytes(digest.into())
}
