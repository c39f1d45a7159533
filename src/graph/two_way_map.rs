use fnv::FnvHashMap;
use std::hash::Hash;

/// Bidirectional map between a stable key (e.g. a GFA segment id) and a
/// dense index (e.g. a position in `VariationGraph::vertices`). Keeps the
/// `vertex_id <-> vertex_index` bijection required by spec.md §3.1.
#[derive(Debug, Default, Clone)]
pub struct TwoWayMap<K, V> {
    fwd: FnvHashMap<K, V>,
    rev: FnvHashMap<V, K>,
}

impl<K, V> TwoWayMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            fwd: FnvHashMap::default(),
            rev: FnvHashMap::default(),
        }
    }

    pub fn insert(&mut self, k: K, v: V) {
        self.fwd.insert(k.clone(), v.clone());
        self.rev.insert(v, k);
    }

    pub fn by_key(&self, k: &K) -> Option<&V> {
        self.fwd.get(k)
    }

    pub fn by_value(&self, v: &V) -> Option<&K> {
        self.rev.get(v)
    }

    pub fn contains_key(&self, k: &K) -> bool {
        self.fwd.contains_key(k)
    }

    pub fn len(&self) -> usize {
        self.fwd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fwd.is_empty()
    }
}
