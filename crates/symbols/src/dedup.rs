use std::collections::HashSet;

/// Symbol hashes already emitted during one index parsing pass.
///
/// Scoped to a single pass: hashes seen in other builds are not tracked.
#[derive(Debug, Default)]
pub struct SeenHashes {
    seen: HashSet<String>,
}

impl SeenHashes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.seen.contains(hash)
    }

    /// Records `hash`, returning `false` when it was already present.
    pub fn insert(&mut self, hash: &str) -> bool {
        if self.seen.contains(hash) {
            return false;
        }
        self.seen.insert(hash.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
