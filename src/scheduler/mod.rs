//! Deferred work, measured in pulses.
//!
//! Everything time-based in the game (casting, cooldowns, delayed commands,
//! deaths) is an event in here. An event is a callback plus a payload, due at
//! an absolute pulse, optionally filed under an owner so that it can be found
//! by kind and is cancelled wholesale when the owner goes away.
//!
//! Records live in a generation-checked arena. The wheel and the owner lists
//! only hold [`EventHandle`]s, so a stale handle simply fails to resolve.
//! A record is pulled out of both before its callback runs, which is what
//! lets a callback cancel anything, schedule anything, or destroy its own
//! owner.
use crate::prelude::*;
use crate::config::SchedulerConfig;

mod error;
mod record;
pub mod wheel;

pub use error::{ScheduleError, TickError};
pub use record::OwnerEvents;
pub use wheel::{TimeWheel, WheelHandle};

use record::{EventRecord, Links, OwnerList, State};

/// A payload that may refer to things which disappear while it waits.
pub trait Liveness<H: ?Sized> {
    /// Checked right before the callback would run. An invalid payload is
    /// never handed to its callback; the event just finishes.
    fn is_valid(&self, _host: &H) -> bool {
        true
    }
}

/// The world the scheduler runs callbacks against.
pub trait Host: Sized {
    type Kind: Copy + Eq + fmt::Debug;
    type Data: Liveness<Self>;
}

pub type Callback<H> = fn(&mut Fire<'_, H>, &mut <H as Host>::Data) -> Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(Key);
impl fmt::Display for EventHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}.{}", self.0.index(), self.0.generation())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(Key);
impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}.{}", self.0.index(), self.0.generation())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owned,
    Borrowed,
}

/// Event data, tagged with who is responsible for it once the event ends.
///
/// `Owned` data is dropped by the scheduler. `Borrowed` data is handed back
/// through [`Scheduler::take_released`] untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<D> {
    Owned(D),
    Borrowed(D),
}
impl<D> Payload<D> {
    fn split(self) -> (D, Ownership) {
        match self {
            Payload::Owned(d) => (d, Ownership::Owned),
            Payload::Borrowed(d) => (d, Ownership::Borrowed),
        }
    }
}

/// What a callback wants done with its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    /// Fire again this many pulses from now. Same handle, same owner.
    Reschedule(u64),
    /// Finish, and hand the payload back even if the event owned it.
    FinishedKeepPayload,
    /// Finish, and drop the payload even if it was borrowed.
    FinishedForceFreePayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Drop,
    HandBack,
}
impl Outcome {
    fn disposition(self, ownership: Ownership) -> Disposition {
        match (self, ownership) {
            (Outcome::FinishedKeepPayload, _) => Disposition::HandBack,
            (Outcome::FinishedForceFreePayload, _) => Disposition::Drop,
            (_, Ownership::Owned) => Disposition::Drop,
            (_, Ownership::Borrowed) => Disposition::HandBack,
        }
    }
}

/// A payload the scheduler is done with but doesn't own.
pub struct Released<H: Host> {
    pub kind: H::Kind,
    pub data: H::Data,
}
impl<H: Host> fmt::Debug for Released<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Released").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Everything a running callback may touch.
pub struct Fire<'a, H: Host> {
    pub scheduler: &'a mut Scheduler<H>,
    pub host: &'a mut H,
    handle: EventHandle,
    kind: H::Kind,
    owner: Option<OwnerId>,
    now: u64,
}
impl<H: Host> Fire<'_, H> {
    pub fn handle(&self) -> EventHandle {
        self.handle
    }
    pub fn kind(&self) -> H::Kind {
        self.kind
    }
    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }
    pub fn now(&self) -> u64 {
        self.now
    }
}

pub struct Scheduler<H: Host> {
    wheel: TimeWheel<EventHandle>,
    records: SlotMap<EventRecord<H>>,
    owners: SlotMap<OwnerList>,
    released: Vec<Released<H>>,

    now: u64,
    running: Option<EventHandle>,
    draining: bool,
    max_fires_per_tick: usize,
}

impl<H: Host> fmt::Debug for Scheduler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.wheel.len())
            .field("records", &self.records.len())
            .field("owners", &self.owners.len())
            .field("running", &self.running)
            .finish()
    }
}

impl<H: Host> Scheduler<H> {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self::starting_at(config, 0)
    }
    /// A scheduler whose last drained pulse is `now`.
    pub fn starting_at(config: &SchedulerConfig, now: u64) -> Self {
        Self {
            wheel: TimeWheel::new(config.buckets, now.saturating_add(1)),
            records: SlotMap::new(),
            owners: SlotMap::new(),
            released: vec![],
            now,
            running: None,
            draining: false,
            max_fires_per_tick: config.max_fires_per_tick.max(1),
        }
    }

    /// The pulse being drained, or the last one drained.
    pub fn now(&self) -> u64 {
        self.now
    }
    pub fn next_tick(&self) -> u64 {
        self.now + 1
    }
    /// Live records, including one whose callback is running.
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// Records waiting in the wheel.
    pub fn pending(&self) -> usize {
        self.wheel.len()
    }

    pub fn register_owner(&mut self) -> OwnerId {
        OwnerId(self.owners.insert(OwnerList::default()))
    }
    /// Cancels everything `owner` has queued and forgets it. Entity teardown
    /// must go through here.
    pub fn release_owner(&mut self, owner: OwnerId) -> Result<usize, ScheduleError> {
        let cancelled = self.cancel_all(owner)?;
        self.owners.release(owner.0);
        Ok(cancelled)
    }
    pub fn owner_len(&self, owner: OwnerId) -> Option<usize> {
        self.owners.get(owner.0).map(OwnerList::len)
    }

    /// Queues `callback` to run `delay` pulses from now.
    ///
    /// Scheduled from inside a callback, a delay of 0 runs later in the same
    /// pulse. From outside, it runs on the next pulse.
    pub fn schedule(
        &mut self,
        kind: H::Kind,
        callback: Callback<H>,
        payload: Payload<H::Data>,
        owner: Option<OwnerId>,
        delay: u64,
    ) -> Result<EventHandle, ScheduleError> {
        if let Some(owner) = owner.filter(|o| !self.owners.contains(o.0)) {
            return Err(ScheduleError::UnknownOwner(owner));
        }
        let (data, ownership) = payload.split();
        let handle = EventHandle(self.records.insert(EventRecord {
            kind,
            callback,
            data: Some(data),
            ownership,
            owner,
            state: State::Detached,
            links: Links::default(),
        }));
        self.arm(handle, self.now.saturating_add(delay));
        if let Some(owner) = owner {
            self.link(owner, handle);
        }
        log::trace!("{handle}: {kind:?} queued for {owner:?} in {delay}");
        Ok(handle)
    }

    fn arm(&mut self, handle: EventHandle, key: u64) {
        let slot = self.wheel.insert(handle, key);
        if let Some(record) = self.records.get_mut(handle.0) {
            record.state = State::Queued(slot);
        }
    }
    fn link(&mut self, owner: OwnerId, handle: EventHandle) {
        if let Some(list) = self.owners.get_mut(owner.0) {
            list.push_front(&mut self.records, handle);
        }
    }
    fn unlink(&mut self, handle: EventHandle) {
        let Some(owner) = self.records.get(handle.0).map(|r| r.owner) else {
            return;
        };
        match owner.and_then(|o| self.owners.get_mut(o.0)) {
            Some(list) => {
                list.unlink(&mut self.records, handle);
            }
            None => {
                if let Some(record) = self.records.get_mut(handle.0) {
                    record.links = Links::default();
                }
            }
        }
    }

    /// Removes an event before it fires.
    ///
    /// Cancelling the event whose callback is running is allowed: it won't be
    /// rescheduled, whatever the callback returns.
    pub fn cancel(&mut self, handle: EventHandle) -> Result<(), ScheduleError> {
        let record = self.records.get_mut(handle.0)
            .ok_or(ScheduleError::AlreadyRemoved(handle))?;
        match record.state {
            State::Running { cancelled: true } => return Err(ScheduleError::AlreadyRemoved(handle)),
            State::Running { cancelled: false } => {
                record.state = State::Running { cancelled: true };
                log::trace!("{handle}: cancelled while running");
                return Ok(());
            }
            State::Queued(slot) => {
                if self.wheel.remove(slot).is_none() {
                    log::error!("{handle}: queued record was missing from the wheel");
                }
            }
            State::Detached => {}
        }
        self.unlink(handle);
        let record = self.records.release(handle.0)
            .ok_or(ScheduleError::AlreadyRemoved(handle))?;
        log::trace!("{handle}: {:?} cancelled", record.kind);
        if let Some(data) = record.data {
            self.dispose(record.kind, data, Outcome::Finished.disposition(record.ownership));
        }
        Ok(())
    }

    /// Cancels the newest event of `kind` filed under `owner`.
    pub fn cancel_by_kind(&mut self, owner: OwnerId, kind: H::Kind) -> Result<EventHandle, ScheduleError> {
        if !self.owners.contains(owner.0) {
            return Err(ScheduleError::UnknownOwner(owner));
        }
        let handle = self.find(owner, kind).ok_or(ScheduleError::NotFound(owner))?;
        self.cancel(handle)?;
        Ok(handle)
    }

    /// Cancels everything filed under `owner`, including its running event if
    /// there is one. The owner stays registered.
    pub fn cancel_all(&mut self, owner: OwnerId) -> Result<usize, ScheduleError> {
        let list = self.owners.get_mut(owner.0).ok_or(ScheduleError::UnknownOwner(owner))?;
        let mut cancelled = 0;
        for handle in list.take_all(&mut self.records) {
            match self.cancel(handle) {
                Ok(()) => cancelled += 1,
                Err(e) => log::debug!("cancelling events of {owner}: {e}"),
            }
        }
        if let Some(running) = self.running {
            let record = self.records.get_mut(running.0)
                .filter(|r| r.owner == Some(owner) && r.state == State::Running { cancelled: false });
            if let Some(record) = record {
                record.state = State::Running { cancelled: true };
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    pub fn find(&self, owner: OwnerId, kind: H::Kind) -> Option<EventHandle> {
        self.events(owner).find(|&(_, k, _)| k == kind).map(|(h, _, _)| h)
    }
    pub fn has_event(&self, owner: OwnerId, kind: H::Kind) -> bool {
        self.find(owner, kind).is_some()
    }
    /// Queued events filed under `owner`, newest first. The running event
    /// isn't listed.
    pub fn events(&self, owner: OwnerId) -> OwnerEvents<'_, H> {
        match self.owners.get(owner.0) {
            Some(list) => list.iter(&self.records),
            None => OwnerEvents::empty(&self.records),
        }
    }
    /// Whether the callback running right now is `owner`'s event of `kind`.
    pub fn is_running(&self, owner: OwnerId, kind: H::Kind) -> bool {
        self.running
            .and_then(|h| self.records.get(h.0))
            .map_or(false, |r| r.owner == Some(owner) && r.kind == kind && r.state == State::Running { cancelled: false })
    }
    pub fn kind_of(&self, handle: EventHandle) -> Option<H::Kind> {
        self.records.get(handle.0).map(|r| r.kind)
    }
    pub fn is_pending(&self, handle: EventHandle) -> bool {
        self.records.get(handle.0).map_or(false, |r| matches!(r.state, State::Queued(_)))
    }
    /// Pulses left until the event fires. 0 while it is running.
    pub fn time_left(&self, handle: EventHandle) -> Result<u64, ScheduleError> {
        let record = self.records.get(handle.0).ok_or(ScheduleError::AlreadyRemoved(handle))?;
        match record.state {
            State::Queued(slot) => Ok(self.wheel.key_of(slot).map_or(0, |key| key.saturating_sub(self.now))),
            State::Running { cancelled: false } | State::Detached => Ok(0),
            State::Running { cancelled: true } => Err(ScheduleError::AlreadyRemoved(handle)),
        }
    }

    /// Borrowed payloads of events that have ended since the last call.
    pub fn take_released(&mut self) -> Vec<Released<H>> {
        core::mem::take(&mut self.released)
    }
    fn dispose(&mut self, kind: H::Kind, data: H::Data, disposition: Disposition) {
        match disposition {
            Disposition::Drop => drop(data),
            Disposition::HandBack => self.released.push(Released { kind, data }),
        }
    }
}

impl<H: Host> Scheduler<H> {
    /// Runs every event due at `now`, which must be [`Self::next_tick`].
    ///
    /// Gives up after `max_fires_per_tick` callbacks. Whatever was still due
    /// then stays queued and fires a lap late, if the caller carries on at all.
    pub fn tick(&mut self, now: u64, host: &mut H) -> Result<usize, TickError> {
        if self.draining {
            return Err(TickError::Reentrant { now });
        }
        if now != self.next_tick() {
            return Err(TickError::OutOfOrder { expected: self.next_tick(), now });
        }
        self.now = now;
        self.draining = true;

        let mut fired = 0;
        let result = loop {
            if !self.wheel.peek_due(now) {
                break Ok(fired);
            }
            if fired >= self.max_fires_per_tick {
                log::error!("pulse {now}: gave up after {fired} events, runaway rescheduling?");
                break Err(TickError::Runaway { now, limit: self.max_fires_per_tick });
            }
            let Some((_, handle)) = self.wheel.pop_due(now) else {
                break Ok(fired);
            };
            self.fire(handle, now, host);
            fired += 1;
        };

        self.draining = false;
        self.wheel.advance(now);
        result
    }

    /// Runs pulses until `target` has been drained.
    pub fn tick_until(&mut self, target: u64, host: &mut H) -> Result<usize, TickError> {
        let mut fired = 0;
        while self.now < target {
            fired += self.tick(self.now + 1, host)?;
        }
        Ok(fired)
    }

    fn fire(&mut self, handle: EventHandle, now: u64, host: &mut H) {
        let Some(record) = self.records.get_mut(handle.0) else {
            log::error!("{handle}: in the wheel without a record");
            return;
        };
        record.state = State::Running { cancelled: false };
        let (kind, callback, owner) = (record.kind, record.callback, record.owner);
        let data = record.data.take();
        self.unlink(handle);
        let Some(mut data) = data else {
            log::error!("{handle}: {kind:?} queued without a payload");
            self.records.release(handle.0);
            return;
        };

        self.running = Some(handle);
        let outcome = if data.is_valid(host) {
            log::trace!("pulse {now}: firing {handle} {kind:?}");
            let mut fire = Fire { scheduler: &mut *self, host, handle, kind, owner, now };
            callback(&mut fire, &mut data)
        } else {
            log::debug!("pulse {now}: {handle} {kind:?} lost its target");
            Outcome::Finished
        };
        self.running = None;
        self.complete(handle, data, outcome, now);
    }

    fn complete(&mut self, handle: EventHandle, data: H::Data, outcome: Outcome, now: u64) {
        let Some(record) = self.records.get(handle.0) else {
            log::error!("{handle}: record vanished while running");
            return;
        };
        let cancelled = record.state == State::Running { cancelled: true };
        let owner = record.owner;
        let kind = record.kind;

        let mut outcome = outcome;
        if let Outcome::Reschedule(delay) = outcome {
            let orphaned = owner.map_or(false, |o| !self.owners.contains(o.0));
            if !cancelled && !orphaned {
                if let Some(record) = self.records.get_mut(handle.0) {
                    record.data = Some(data);
                }
                self.arm(handle, now.saturating_add(delay));
                if let Some(owner) = owner {
                    self.link(owner, handle);
                }
                return;
            }
            if orphaned {
                log::debug!("{handle}: {kind:?} outlived its owner, not rescheduling");
            }
            outcome = Outcome::Finished;
        }
        if cancelled {
            outcome = Outcome::Finished;
        }
        if let Some(record) = self.records.release(handle.0) {
            self.dispose(kind, data, outcome.disposition(record.ownership));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        fired: Vec<(u64, &'static str)>,
        victim: Option<EventHandle>,
        cancelled: Option<Result<(), ScheduleError>>,
    }
    #[derive(Debug, PartialEq)]
    struct Note(&'static str);
    impl Liveness<Log> for Note {}
    impl Host for Log {
        type Kind = &'static str;
        type Data = Note;
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig { buckets: 4, max_fires_per_tick: 64 }
    }
    fn record(fire: &mut Fire<'_, Log>, note: &mut Note) -> Outcome {
        fire.host.fired.push((fire.now(), note.0));
        Outcome::Finished
    }
    fn every_third(fire: &mut Fire<'_, Log>, note: &mut Note) -> Outcome {
        fire.host.fired.push((fire.now(), note.0));
        Outcome::Reschedule(3)
    }
    fn cancel_victim(fire: &mut Fire<'_, Log>, note: &mut Note) -> Outcome {
        fire.host.fired.push((fire.now(), note.0));
        if let Some(victim) = fire.host.victim {
            fire.host.cancelled = Some(fire.scheduler.cancel(victim));
        }
        Outcome::Finished
    }
    fn cancel_self(fire: &mut Fire<'_, Log>, note: &mut Note) -> Outcome {
        fire.host.fired.push((fire.now(), note.0));
        let me = fire.handle();
        fire.scheduler.cancel(me).expect("first cancel of a running event succeeds");
        assert_eq!(fire.scheduler.cancel(me), Err(ScheduleError::AlreadyRemoved(me)));
        Outcome::Reschedule(1)
    }
    fn spin(_: &mut Fire<'_, Log>, _: &mut Note) -> Outcome {
        Outcome::Reschedule(0)
    }
    fn reenter(fire: &mut Fire<'_, Log>, _: &mut Note) -> Outcome {
        let next = fire.scheduler.next_tick();
        assert_eq!(fire.scheduler.tick(next, &mut Log::default()), Err(TickError::Reentrant { now: next }));
        Outcome::Finished
    }

    #[test]
    fn reschedule_fires_every_k_pulses_until_cancelled() {
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        let h = events.schedule("regen", every_third, Payload::Owned(Note("regen")), None, 3).unwrap();
        events.tick_until(12, &mut log).unwrap();
        assert_eq!(log.fired, [(3, "regen"), (6, "regen"), (9, "regen"), (12, "regen")]);
        assert_eq!(events.time_left(h), Ok(3));

        events.cancel(h).unwrap();
        events.tick_until(30, &mut log).unwrap();
        assert_eq!(log.fired.len(), 4);
        assert_eq!(events.cancel(h), Err(ScheduleError::AlreadyRemoved(h)));
        assert!(events.is_empty());
    }

    #[test]
    fn cancel_inside_same_pulse_either_order() {
        // canceller first: the victim never runs
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        events.schedule("a", cancel_victim, Payload::Owned(Note("a")), None, 0).unwrap();
        let b = events.schedule("b", record, Payload::Owned(Note("b")), None, 0).unwrap();
        log.victim = Some(b);
        events.tick(1, &mut log).unwrap();
        assert_eq!(log.fired, [(1, "a")]);
        assert_eq!(log.cancelled, Some(Ok(())));
        assert!(events.is_empty());

        // victim first: it has already run, and the late cancel is refused cleanly
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        let b = events.schedule("b", record, Payload::Owned(Note("b")), None, 0).unwrap();
        events.schedule("a", cancel_victim, Payload::Owned(Note("a")), None, 0).unwrap();
        log.victim = Some(b);
        events.tick(1, &mut log).unwrap();
        assert_eq!(log.fired, [(1, "b"), (1, "a")]);
        assert_eq!(log.cancelled, Some(Err(ScheduleError::AlreadyRemoved(b))));
        assert!(events.is_empty());
    }

    #[test]
    fn running_event_can_cancel_itself() {
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        let h = events.schedule("once", cancel_self, Payload::Borrowed(Note("once")), None, 2).unwrap();
        events.tick_until(10, &mut log).unwrap();
        assert_eq!(log.fired, [(2, "once")]);
        assert!(!events.is_pending(h));
        // borrowed data comes back even though the event was cut short
        let released = events.take_released();
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].data, Note("once"));
    }

    #[test]
    fn delay_zero_outside_a_pulse_runs_next_pulse() {
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        events.tick(1, &mut log).unwrap();
        let h = events.schedule("now", record, Payload::Owned(Note("now")), None, 0).unwrap();
        assert_eq!(events.time_left(h), Ok(1));
        events.tick(2, &mut log).unwrap();
        assert_eq!(log.fired, [(2, "now")]);
    }

    #[test]
    fn pulses_must_arrive_in_order() {
        let mut log = Log::default();
        let mut events = Scheduler::<Log>::new(&config());
        assert_eq!(events.tick(2, &mut log), Err(TickError::OutOfOrder { expected: 1, now: 2 }));
        events.tick(1, &mut log).unwrap();
        assert_eq!(events.tick(1, &mut log), Err(TickError::OutOfOrder { expected: 2, now: 1 }));
    }

    #[test]
    fn runaway_pulse_is_bounded() {
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        events.schedule("spin", spin, Payload::Owned(Note("spin")), None, 1).unwrap();
        assert_eq!(events.tick(1, &mut log), Err(TickError::Runaway { now: 1, limit: 64 }));
        assert_eq!(events.pending(), 1);
    }

    #[test]
    fn tick_from_a_callback_is_refused() {
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        events.schedule("reenter", reenter, Payload::Owned(Note("reenter")), None, 1).unwrap();
        assert_eq!(events.tick(1, &mut log), Ok(1));
    }

    #[test]
    fn payload_disposition() {
        fn keep(_: &mut Fire<'_, Log>, _: &mut Note) -> Outcome {
            Outcome::FinishedKeepPayload
        }
        fn free(_: &mut Fire<'_, Log>, _: &mut Note) -> Outcome {
            Outcome::FinishedForceFreePayload
        }
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        events.schedule("a", record, Payload::Owned(Note("owned")), None, 1).unwrap();
        events.schedule("b", record, Payload::Borrowed(Note("borrowed")), None, 1).unwrap();
        events.schedule("c", keep, Payload::Owned(Note("kept")), None, 1).unwrap();
        events.schedule("d", free, Payload::Borrowed(Note("freed")), None, 1).unwrap();
        events.tick(1, &mut log).unwrap();
        let back: Vec<_> = events.take_released().into_iter().map(|r| (r.kind, r.data.0)).collect();
        assert_eq!(back, [("b", "borrowed"), ("c", "kept")]);
        assert!(events.take_released().is_empty());
    }

    #[test]
    fn owner_lists_track_membership() {
        let mut log = Log::default();
        let mut events = Scheduler::new(&config());
        let owner = events.register_owner();
        let a = events.schedule("a", record, Payload::Owned(Note("a")), Some(owner), 5).unwrap();
        let b = events.schedule("b", every_third, Payload::Owned(Note("b")), Some(owner), 1).unwrap();
        let kinds: Vec<_> = events.events(owner).map(|(_, k, _)| k).collect();
        assert_eq!(kinds, ["b", "a"]);
        assert_eq!(events.owner_len(owner), Some(2));

        // b comes back into the list after firing
        events.tick(1, &mut log).unwrap();
        assert_eq!(events.owner_len(owner), Some(2));
        assert_eq!(events.find(owner, "b"), Some(b));

        assert_eq!(events.cancel_by_kind(owner, "a"), Ok(a));
        assert_eq!(events.cancel_by_kind(owner, "a"), Err(ScheduleError::NotFound(owner)));
        assert_eq!(events.release_owner(owner), Ok(1));
        assert_eq!(events.cancel_all(owner), Err(ScheduleError::UnknownOwner(owner)));
        assert_eq!(
            events.schedule("c", record, Payload::Owned(Note("c")), Some(owner), 1),
            Err(ScheduleError::UnknownOwner(owner)),
        );
        assert!(events.is_empty());
    }
}
