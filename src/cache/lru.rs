//! Recency List Module
//!
//! Implements the Least Recently Used ordering for cache eviction as an
//! intrusive doubly-linked list stored in an arena.

// == Node ==
/// Slot in the arena. Links are arena indices, not pointers.
#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Doubly-linked list of items ordered by recency.
///
/// - Front = Most recently used
/// - Back = Least recently used
///
/// `push_front` hands out a stable handle that stays valid until the item is
/// removed, so an index can jump straight to a node. Every operation is O(1).
/// Freed slots are recycled through a free list.
#[derive(Debug)]
pub struct RecencyList<T> {
    nodes: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` items before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Push Front ==
    /// Inserts an item as most recently used and returns its handle.
    pub fn push_front(&mut self, item: T) -> usize {
        let node = Node {
            item,
            prev: None,
            next: self.head,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };

        match self.head {
            Some(head) => self.node_mut(head).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Marks the item at `idx` as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }

        self.unlink(idx);

        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.node_mut(head).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    // == Remove ==
    /// Removes the item at `idx` and returns it.
    ///
    /// Returns None if the handle does not refer to a live item.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        if !matches!(self.nodes.get(idx), Some(Some(_))) {
            return None;
        }

        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.free.push(idx);
        self.len -= 1;
        Some(node.item)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Accessors ==
    /// Returns the item at `idx`.
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.nodes.get(idx)?.as_ref().map(|node| &node.item)
    }

    /// Returns the item at `idx` mutably.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.nodes.get_mut(idx)?.as_mut().map(|node| &mut node.item)
    }

    /// Returns the least recently used item without removing it.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|idx| self.get(idx))
    }

    /// Returns the most recently used item.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|idx| self.get(idx))
    }

    /// Returns the number of items in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every item and empties the arena. The allocation is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iteration ==
    /// Iterates from most to least recently used, yielding `(handle, item)`.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Internal Helpers ==
    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        match self.nodes[idx].as_mut() {
            Some(node) => node,
            None => unreachable!("recency list link points at a free slot"),
        }
    }

    /// Detaches a node from its neighbours, patching head/tail.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }
}

// == Iterator ==
/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.list.nodes[idx].as_ref()?;
        self.cursor = node.next;
        Some((idx, &node.item))
    }
}
