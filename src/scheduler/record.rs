use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    /// Allocated but not yet placed in the wheel.
    Detached,
    Queued(WheelHandle),
    /// Out of every index while its callback runs.
    Running { cancelled: bool },
}

/// Membership in an owner's list. Only meaningful while `linked`.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct Links {
    pub linked: bool,
    pub prev: Option<EventHandle>,
    pub next: Option<EventHandle>,
}

pub(super) struct EventRecord<H: Host> {
    pub kind: H::Kind,
    pub callback: Callback<H>,
    // taken while the callback runs
    pub data: Option<H::Data>,
    pub ownership: Ownership,
    pub owner: Option<OwnerId>,
    pub state: State,
    pub links: Links,
}

pub(super) type Records<H> = SlotMap<EventRecord<H>>;

/// The events hanging off one entity. Doesn't own them; the scheduler's
/// record arena does.
#[derive(Debug, Default)]
pub(super) struct OwnerList {
    head: Option<EventHandle>,
    len: usize,
}

impl OwnerList {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn push_front<H: Host>(&mut self, records: &mut Records<H>, handle: EventHandle) {
        let old = self.head.replace(handle);
        if let Some(record) = old.and_then(|h| records.get_mut(h.0)) {
            record.links.prev = Some(handle);
        }
        if let Some(record) = records.get_mut(handle.0) {
            record.links = Links { linked: true, prev: None, next: old };
        }
        self.len += 1;
    }

    /// Detaches `handle`, which must belong to this list if it is linked at all.
    pub fn unlink<H: Host>(&mut self, records: &mut Records<H>, handle: EventHandle) -> bool {
        let Some(record) = records.get_mut(handle.0) else {
            return false;
        };
        if !record.links.linked {
            return false;
        }
        let Links { prev, next, .. } = core::mem::take(&mut record.links);
        match prev.and_then(|h| records.get_mut(h.0)) {
            Some(p) => p.links.next = next,
            None => self.head = next,
        }
        if let Some(n) = next.and_then(|h| records.get_mut(h.0)) {
            n.links.prev = prev;
        }
        self.len -= 1;
        true
    }

    /// Empties the list, unlinking every member before handing it back.
    pub fn take_all<H: Host>(&mut self, records: &mut Records<H>) -> Vec<EventHandle> {
        let mut taken = Vec::with_capacity(self.len);
        let mut cursor = self.head.take();
        while let Some(handle) = cursor {
            cursor = records.get_mut(handle.0)
                .and_then(|r| core::mem::take(&mut r.links).next);
            taken.push(handle);
        }
        self.len = 0;
        taken
    }

    pub fn iter<'a, H: Host>(&self, records: &'a Records<H>) -> OwnerEvents<'a, H> {
        OwnerEvents { records, next: self.head }
    }
}

/// Events queued for one owner, newest first.
pub struct OwnerEvents<'a, H: Host> {
    records: &'a Records<H>,
    next: Option<EventHandle>,
}
impl<'a, H: Host> OwnerEvents<'a, H> {
    pub(super) fn empty(records: &'a Records<H>) -> Self {
        Self { records, next: None }
    }
}
impl<'a, H: Host> Iterator for OwnerEvents<'a, H> {
    type Item = (EventHandle, H::Kind, &'a H::Data);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let handle = self.next?;
            let record = self.records.get(handle.0)?;
            self.next = record.links.next;
            // linked records are always queued, so their data is present
            if let Some(data) = &record.data {
                return Some((handle, record.kind, data));
            }
        }
    }
}
