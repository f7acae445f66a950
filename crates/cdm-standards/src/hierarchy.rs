//! Bounded ancestor search over direct parent links.

use std::collections::{HashMap, HashSet, VecDeque};

use cdm_model::ConceptId;

/// Parent levels walked before giving up.
pub const MAX_ANCESTOR_DEPTH: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct ConceptHierarchy {
    parents: HashMap<ConceptId, Vec<ConceptId>>,
}

impl ConceptHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `parent` is a direct ancestor of `child`.
    pub fn add_parent(&mut self, child: ConceptId, parent: ConceptId) {
        if child == parent {
            return;
        }
        let parents = self.parents.entry(child).or_default();
        if !parents.contains(&parent) {
            parents.push(parent);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.parents.values().map(Vec::len).sum()
    }

    /// True when `ancestor` is reachable from `descendant` within
    /// [`MAX_ANCESTOR_DEPTH`] parent steps. A concept counts as its own
    /// ancestor at depth zero.
    pub fn has_ancestor(&self, descendant: ConceptId, ancestor: ConceptId) -> bool {
        if descendant == ancestor {
            return true;
        }
        let mut seen = HashSet::from([descendant]);
        let mut queue = VecDeque::from([(descendant, 0usize)]);
        while let Some((concept, depth)) = queue.pop_front() {
            if depth == MAX_ANCESTOR_DEPTH {
                continue;
            }
            let Some(parents) = self.parents.get(&concept) else {
                continue;
            };
            for &parent in parents {
                if parent == ancestor {
                    return true;
                }
                if seen.insert(parent) {
                    queue.push_back((parent, depth + 1));
                }
            }
        }
        false
    }
}
