//! Bucketed timer wheel keyed by absolute pulse.
//!
//! Each of the `N` buckets holds the entries whose key is congruent to the
//! bucket index mod `N`, as a doubly linked list sorted ascending by key
//! (equal keys in insertion order). New entries are placed by scanning back
//! from the tail, which is O(1) when the new key is the bucket's largest,
//! the usual case for timers a few pulses out.
//!
//! Entries more than a lap ahead share a bucket with nearer ones but sit
//! behind them, and `pop_due` compares each entry's own key against `now`.
//! They wait out the extra laps instead of firing early.
//!
//! The cursor is the earliest pulse that hasn't been fully drained. Keys are
//! clamped up to it on insert, so nothing lands in a bucket that has already
//! been visited for its pulse.
use crate::prelude::*;

/// Position of an entry in a [`TimeWheel`]. Goes stale once the entry leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WheelHandle(Key);

#[derive(Debug)]
struct Node<T> {
    key: u64,
    prev: Option<Key>,
    next: Option<Key>,
    item: T,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    head: Option<Key>,
    tail: Option<Key>,
}

#[derive(Debug)]
pub struct TimeWheel<T> {
    buckets: Vec<Bucket>,
    nodes: SlotMap<Node<T>>,
    cursor: u64,
}

impl<T> TimeWheel<T> {
    /// `buckets` is clamped to at least one. `cursor` is the first pulse
    /// that will be drained.
    pub fn new(buckets: usize, cursor: u64) -> Self {
        Self {
            buckets: vec![Bucket::default(); buckets.max(1)],
            nodes: SlotMap::new(),
            cursor,
        }
    }
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    fn bucket_of(&self, key: u64) -> usize {
        (key % self.buckets.len() as u64) as usize
    }

    pub fn insert(&mut self, item: T, key: u64) -> WheelHandle {
        let key = key.max(self.cursor);
        let b = self.bucket_of(key);
        let bucket = self.buckets[b];

        // walk back past everything due strictly later
        let mut after = bucket.tail;
        while let Some(k) = after {
            let node = self.nodes.get(k).expect("wheel bucket links a released node");
            if node.key <= key {
                break;
            }
            after = node.prev;
        }
        let before = match after {
            Some(k) => self.nodes.get(k).and_then(|n| n.next),
            None => bucket.head,
        };
        let new = self.nodes.insert(Node { key, prev: after, next: before, item });
        match after {
            Some(k) => self.node_mut(k).next = Some(new),
            None => self.buckets[b].head = Some(new),
        }
        match before {
            Some(k) => self.node_mut(k).prev = Some(new),
            None => self.buckets[b].tail = Some(new),
        }
        WheelHandle(new)
    }

    fn node_mut(&mut self, k: Key) -> &mut Node<T> {
        self.nodes.get_mut(k).expect("wheel bucket links a released node")
    }

    /// Unlinks an entry. `None` if the handle has already left the wheel.
    pub fn remove(&mut self, handle: WheelHandle) -> Option<(u64, T)> {
        let node = self.nodes.release(handle.0)?;
        let b = self.bucket_of(node.key);
        match node.prev {
            Some(k) => self.node_mut(k).next = node.next,
            None => self.buckets[b].head = node.next,
        }
        match node.next {
            Some(k) => self.node_mut(k).prev = node.prev,
            None => self.buckets[b].tail = node.prev,
        }
        Some((node.key, node.item))
    }

    pub fn key_of(&self, handle: WheelHandle) -> Option<u64> {
        self.nodes.get(handle.0).map(|n| n.key)
    }
    pub fn get(&self, handle: WheelHandle) -> Option<&T> {
        self.nodes.get(handle.0).map(|n| &n.item)
    }

    fn due_head(&self, now: u64) -> Option<Key> {
        let head = self.buckets[self.bucket_of(now)].head?;
        let node = self.nodes.get(head)?;
        (node.key <= now).then_some(head)
    }
    pub fn peek_due(&self, now: u64) -> bool {
        self.due_head(now).is_some()
    }
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, T)> {
        let head = self.due_head(now)?;
        self.remove(WheelHandle(head))
    }

    /// Marks `now` as drained. Later inserts are clamped to `now + 1`.
    pub fn advance(&mut self, now: u64) {
        self.cursor = self.cursor.max(now.saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(wheel: &mut TimeWheel<&'static str>, now: u64) -> Vec<&'static str> {
        let mut fired = vec![];
        while let Some((key, item)) = wheel.pop_due(now) {
            assert!(key <= now);
            fired.push(item);
        }
        wheel.advance(now);
        fired
    }

    #[test]
    fn same_key_keeps_insertion_order() {
        let mut wheel = TimeWheel::new(8, 0);
        wheel.insert("a", 3);
        wheel.insert("b", 3);
        wheel.insert("c", 3);
        for now in 0..3 {
            assert!(drain(&mut wheel, now).is_empty());
        }
        assert_eq!(drain(&mut wheel, 3), ["a", "b", "c"]);
        assert!(wheel.is_empty());
    }

    #[test]
    fn far_keys_wait_out_their_laps() {
        let mut wheel = TimeWheel::new(4, 0);
        // all of these share bucket 1
        wheel.insert("lap2", 9);
        wheel.insert("lap0", 1);
        wheel.insert("lap1", 5);
        let mut fired = vec![];
        for now in 0..=9 {
            for item in drain(&mut wheel, now) {
                fired.push((now, item));
            }
        }
        assert_eq!(fired, [(1, "lap0"), (5, "lap1"), (9, "lap2")]);
    }

    #[test]
    fn remove_relinks_neighbours() {
        let mut wheel = TimeWheel::new(2, 0);
        let _a = wheel.insert("a", 2);
        let b = wheel.insert("b", 2);
        let _c = wheel.insert("c", 2);
        assert_eq!(wheel.remove(b), Some((2, "b")));
        assert_eq!(wheel.remove(b), None);
        assert_eq!(wheel.key_of(b), None);
        assert_eq!(drain(&mut wheel, 2), ["a", "c"]);
    }

    #[test]
    fn inserts_behind_the_cursor_are_clamped() {
        let mut wheel = TimeWheel::new(4, 0);
        assert!(drain(&mut wheel, 0).is_empty());
        assert!(drain(&mut wheel, 1).is_empty());
        let late = wheel.insert("late", 1);
        assert_eq!(wheel.key_of(late), Some(2));
        assert!(!wheel.peek_due(1));
        assert!(wheel.peek_due(2));
        assert_eq!(wheel.get(late), Some(&"late"));
        assert_eq!(drain(&mut wheel, 2), ["late"]);
    }

    #[test]
    fn out_of_order_keys_sort_within_bucket() {
        let mut wheel = TimeWheel::new(1, 0);
        wheel.insert("c", 3);
        wheel.insert("a", 1);
        wheel.insert("b", 2);
        wheel.insert("b2", 2);
        assert_eq!(wheel.bucket_count(), 1);
        assert_eq!(drain(&mut wheel, 1), ["a"]);
        assert_eq!(drain(&mut wheel, 2), ["b", "b2"]);
        assert_eq!(drain(&mut wheel, 3), ["c"]);
    }
}
