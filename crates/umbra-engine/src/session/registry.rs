use slotmap::SecondaryMap;

use crate::context::ContextId;

/// Neighbours of a registered context.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Links {
    pub prev: Option<ContextId>,
    pub next: Option<ContextId>,
}

/// Doubly-linked list of live contexts, newest first.
///
/// Links are stored beside the contexts, keyed by id, so splicing never
/// chases raw pointers. Membership is what "still alive" means for bulk
/// teardown.
#[derive(Debug, Default)]
pub struct Registry {
    head: Option<ContextId>,
    links: SecondaryMap<ContextId, Links>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `id` at the head. Already-registered ids are left in place.
    pub fn insert(&mut self, id: ContextId) {
        if self.links.contains_key(id) {
            return;
        }

        let old_head = self.head;
        if let Some(old) = old_head.and_then(|h| self.links.get_mut(h)) {
            old.prev = Some(id);
        }
        self.links.insert(
            id,
            Links {
                prev: None,
                next: old_head,
            },
        );
        self.head = Some(id);
    }

    /// Splices `id` out; returns whether it was registered.
    ///
    /// The removed node's links are dropped with it.
    pub fn remove(&mut self, id: ContextId) -> bool {
        let Some(node) = self.links.remove(id) else {
            return false;
        };

        if let Some(next) = node.next.and_then(|n| self.links.get_mut(n)) {
            next.prev = node.prev;
        }
        if let Some(prev) = node.prev.and_then(|p| self.links.get_mut(p)) {
            prev.next = node.next;
        }
        if self.head == Some(id) {
            self.head = node.next;
        }
        true
    }

    pub fn head(&self) -> Option<ContextId> {
        self.head
    }

    pub fn contains(&self, id: ContextId) -> bool {
        self.links.contains_key(id)
    }

    pub fn links(&self, id: ContextId) -> Option<Links> {
        self.links.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Walks the list from the head.
    pub fn iter(&self) -> impl Iterator<Item = ContextId> + '_ {
        std::iter::successors(self.head, |&id| self.links.get(id).and_then(|l| l.next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<ContextId> {
        let mut keys = SlotMap::<ContextId, ()>::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    /// Checks head/prev/next agree and every registered node is reachable.
    fn assert_consistent(registry: &Registry) {
        let walked: Vec<_> = registry.iter().collect();
        assert_eq!(walked.len(), registry.len());

        if let Some(head) = registry.head() {
            assert_eq!(registry.links(head).unwrap().prev, None);
        }
        for pair in walked.windows(2) {
            assert_eq!(registry.links(pair[0]).unwrap().next, Some(pair[1]));
            assert_eq!(registry.links(pair[1]).unwrap().prev, Some(pair[0]));
        }
        if let Some(&tail) = walked.last() {
            assert_eq!(registry.links(tail).unwrap().next, None);
        }
    }

    fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let first = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, first);
                out.push(tail);
            }
        }
        out
    }

    // ── insert ────────────────────────────────────────────────────────────

    #[test]
    fn insert_places_newest_at_head() {
        let keys = ids(3);
        let mut registry = Registry::new();
        for &k in &keys {
            registry.insert(k);
        }
        let order: Vec<_> = registry.iter().collect();
        assert_eq!(order, vec![keys[2], keys[1], keys[0]]);
        assert_consistent(&registry);
    }

    #[test]
    fn double_insert_is_ignored() {
        let keys = ids(2);
        let mut registry = Registry::new();
        registry.insert(keys[0]);
        registry.insert(keys[1]);
        registry.insert(keys[0]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.head(), Some(keys[1]));
        assert_consistent(&registry);
    }

    // ── remove ────────────────────────────────────────────────────────────

    #[test]
    fn remove_head_middle_tail_and_sole() {
        let keys = ids(3);
        let mut registry = Registry::new();
        for &k in &keys {
            registry.insert(k);
        }

        // list: 2, 1, 0
        assert!(registry.remove(keys[1]));
        assert_consistent(&registry);
        assert!(registry.remove(keys[2]));
        assert_eq!(registry.head(), Some(keys[0]));
        assert_consistent(&registry);
        assert!(registry.remove(keys[0]));
        assert!(registry.is_empty());
        assert_eq!(registry.links(keys[0]), None);
    }

    #[test]
    fn remove_unregistered_is_noop() {
        let keys = ids(2);
        let mut registry = Registry::new();
        registry.insert(keys[0]);
        assert!(!registry.remove(keys[1]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn every_removal_order_empties_consistently() {
        const N: usize = 5;
        for order in permutations(&(0..N).collect::<Vec<_>>()) {
            let keys = ids(N);
            let mut registry = Registry::new();
            for &k in &keys {
                registry.insert(k);
            }
            for (removed, &i) in order.iter().enumerate() {
                assert!(registry.remove(keys[i]));
                assert_eq!(registry.len(), N - removed - 1);
                assert_consistent(&registry);
            }
            assert!(registry.is_empty());
            assert_eq!(registry.head(), None);
        }
    }
}
