use core::cmp::Ordering;

const NOT_QUEUED: usize = usize::MAX;

/// Heap priority: `f` first, then the sequence number stamped when the label was last
/// inserted or improved. Equal `f` therefore settles in first-come order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Priority {
    pub f: f32,
    pub seq: u64,
}

impl Priority {
    fn compare(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    node: usize,
    priority: Priority,
}

/// Binary min-heap over node indices with an index map for in-place decrease-key.
///
/// `slots[node]` is the heap position of `node`, or `NOT_QUEUED`. Both arrays are sized to the
/// node count up front; [`clear`](Self::clear) only touches the entries still queued.
#[derive(Debug, Default)]
pub(crate) struct IndexedMinHeap {
    entries: Vec<Entry>,
    slots: Vec<usize>,
}

impl IndexedMinHeap {
    pub fn with_capacity(nodes: usize) -> Self {
        let mut heap = Self::default();
        heap.reserve_nodes(nodes);
        heap
    }

    /// Grow the index map to cover `nodes`. Never shrinks.
    pub fn reserve_nodes(&mut self, nodes: usize) {
        if self.slots.len() < nodes {
            self.slots.resize(nodes, NOT_QUEUED);
        }
        if self.entries.capacity() < nodes {
            self.entries.reserve(nodes - self.entries.len());
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, node: usize) -> bool {
        self.slots.get(node).is_some_and(|&s| s != NOT_QUEUED)
    }

    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            self.slots[entry.node] = NOT_QUEUED;
        }
    }

    pub fn push(&mut self, node: usize, priority: Priority) {
        debug_assert!(!self.contains(node), "node {node} is already queued");
        let slot = self.entries.len();
        self.entries.push(Entry { node, priority });
        self.slots[node] = slot;
        self.sift_up(slot);
    }

    /// Lower the priority of a queued node. Higher priorities are ignored.
    pub fn decrease_key(&mut self, node: usize, priority: Priority) {
        let slot = self.slots[node];
        debug_assert!(slot != NOT_QUEUED, "node {node} is not queued");
        if priority.compare(&self.entries[slot].priority) == Ordering::Less {
            self.entries[slot].priority = priority;
            self.sift_up(slot);
        }
    }

    /// Insert `node`, or lower its priority if it is already queued.
    pub fn push_or_decrease(&mut self, node: usize, priority: Priority) {
        if self.contains(node) {
            self.decrease_key(node, priority);
        } else {
            self.push(node, priority);
        }
    }

    pub fn pop(&mut self) -> Option<(usize, Priority)> {
        if self.entries.is_empty() {
            return None;
        }
        let top = self.entries.swap_remove(0);
        self.slots[top.node] = NOT_QUEUED;
        if let Some(first) = self.entries.first() {
            self.slots[first.node] = 0;
            self.sift_down(0);
        }
        Some((top.node, top.priority))
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.entries[a].priority.compare(&self.entries[b].priority) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slots[self.entries[a].node] = a;
        self.slots[self.entries[b].node] = b;
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.entries.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < n && self.less(left, smallest) {
                smallest = left;
            }
            if right < n && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap(i, smallest);
            i = smallest;
        }
    }
}
