
/// Handle into a [`SlotMap`].
///
/// The generation is bumped whenever a slot is released, so a key outlives
/// its value safely: it just stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key {
    idx: u32,
    generation: u32,
}
impl Key {
    pub fn index(self) -> usize {
        self.idx as usize
    }
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    // Err holds the next free slot
    value: Result<T, u32>,
}

#[derive(Debug)]
pub struct SlotMap<T> {
    head: u32,
    len: usize,
    entries: Vec<Slot<T>>,
}
impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T> SlotMap<T> {
    pub fn new() -> Self {
        Self {
            head: u32::MAX,
            len: 0,
            entries: vec![],
        }
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    fn slot(&self, key: Key) -> Option<&Slot<T>> {
        self.entries.get(key.index()).filter(|s| s.generation == key.generation)
    }
    pub fn contains(&self, key: Key) -> bool {
        self.get(key).is_some()
    }
    pub fn get(&self, key: Key) -> Option<&T> {
        self.slot(key).and_then(|s| s.value.as_ref().ok())
    }
    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        self.entries.get_mut(key.index())
            .filter(|s| s.generation == key.generation)
            .and_then(|s| s.value.as_mut().ok())
    }
    pub fn insert(&mut self, value: T) -> Key {
        self.len += 1;
        if self.head == u32::MAX {
            let idx = self.entries.len() as u32;
            self.entries.push(Slot { generation: 0, value: Ok(value) });
            Key { idx, generation: 0 }
        } else {
            let idx = self.head;
            let slot = &mut self.entries[idx as usize];
            self.head = match core::mem::replace(&mut slot.value, Ok(value)) {
                Err(next) => next,
                Ok(_) => unreachable!("corrupted slotmap"),
            };
            Key { idx, generation: slot.generation }
        }
    }
    pub fn release(&mut self, key: Key) -> Option<T> {
        let head = self.head;
        let slot = self.entries.get_mut(key.index())
            .filter(|s| s.generation == key.generation && s.value.is_ok())?;
        slot.generation = slot.generation.wrapping_add(1);
        let value = core::mem::replace(&mut slot.value, Err(head)).ok();
        self.head = key.idx;
        self.len -= 1;
        value
    }
}

pub struct Iter<'a, T> {
    entries: core::iter::Enumerate<core::slice::Iter<'a, Slot<T>>>,
}
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Key, &'a T);
    fn next(&mut self) -> Option<Self::Item> {
        for (i, slot) in self.entries.by_ref() {
            if let Ok(v) = &slot.value {
                return Some((Key { idx: i as u32, generation: slot.generation }, v));
            }
        }
        None
    }
}
impl<T> SlotMap<T> {
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { entries: self.entries.iter().enumerate() }
    }
}
