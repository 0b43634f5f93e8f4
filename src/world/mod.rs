use crate::prelude::*;
use crate::scheduler::{EventHandle, Host, Liveness, OwnerId, Payload, Released, ScheduleError, Scheduler};
use std::collections::VecDeque;

mod cooldown;
mod handlers;

pub use cooldown::{Cooldown, Cooldowns, COOLDOWN_PULSE};

pub const PULSES_PER_SEC: u64 = 10;
pub const PULSE_VIOLENCE: u64 = 4 * PULSES_PER_SEC;
/// Pulses between two progress updates of a spell being cast.
pub const CAST_PULSE: u64 = PULSE_VIOLENCE / 2;

pub type Events = Scheduler<World>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharId(Key);

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("no such character {0:?}")]
    NoSuchChar(CharId),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Casting,
    Command,
    Cooldown,
    Die,
    Extract,
    Hurt,
}
impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Casting => "casting",
            EventKind::Command => "command",
            EventKind::Cooldown => "cooldown",
            EventKind::Die => "die",
            EventKind::Extract => "extract",
            EventKind::Hurt => "hurt",
        }
    }
}
impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventData {
    Char(CharId),
    Command { ch: CharId, cmd: String },
    Hurt { victim: CharId, attacker: Option<CharId>, damage: i32 },
    Die { ch: CharId, killer: Option<CharId> },
}
impl EventData {
    /// The character the event happens to.
    pub fn subject(&self) -> CharId {
        match *self {
            EventData::Char(ch) => ch,
            EventData::Command { ch, .. } => ch,
            EventData::Hurt { victim, .. } => victim,
            EventData::Die { ch, .. } => ch,
        }
    }
}
impl Liveness<World> for EventData {
    fn is_valid(&self, world: &World) -> bool {
        world.char(self.subject()).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Casting {
    pub spell: String,
    pub target: Option<CharId>,
    pub time_left: i32,
}

#[derive(Debug)]
pub struct Character {
    pub name: String,
    pub hit: i32,
    pub casting: Option<Casting>,
    pub cooldowns: Cooldowns,

    events: OwnerId,
    outbox: Vec<String>,
    input: VecDeque<String>,
}
impl Character {
    pub fn events(&self) -> OwnerId {
        self.events
    }
    /// Queues text for the network layer to send.
    pub fn submit(&mut self, msg: impl Into<String>) {
        self.outbox.push(msg.into());
    }
    pub fn take_outbox(&mut self) -> Vec<String> {
        core::mem::take(&mut self.outbox)
    }
    /// Input waiting for the command interpreter.
    pub fn next_command(&mut self) -> Option<String> {
        self.input.pop_front()
    }
}

#[derive(Debug, Default)]
pub struct World {
    chars: SlotMap<Character>,
}

impl Host for World {
    type Kind = EventKind;
    type Data = EventData;
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn char(&self, id: CharId) -> Option<&Character> {
        self.chars.get(id.0)
    }
    pub fn char_mut(&mut self, id: CharId) -> Option<&mut Character> {
        self.chars.get_mut(id.0)
    }
    fn char_or_err(&mut self, id: CharId) -> Result<&mut Character, WorldError> {
        self.chars.get_mut(id.0).ok_or(WorldError::NoSuchChar(id))
    }
    pub fn population(&self) -> usize {
        self.chars.len()
    }
    pub fn characters(&self) -> impl Iterator<Item = (CharId, &Character)> + '_ {
        self.chars.iter().map(|(k, c)| (CharId(k), c))
    }

    pub fn spawn(&mut self, events: &mut Events, name: &str, hit: i32) -> CharId {
        let id = CharId(self.chars.insert(Character {
            name: name.to_owned(),
            hit,
            casting: None,
            cooldowns: Cooldowns::default(),
            events: events.register_owner(),
            outbox: vec![],
            input: VecDeque::new(),
        }));
        log::debug!("{name} entered the world as {id:?}");
        id
    }

    /// Removes a character and everything it had pending.
    pub fn extract_char(&mut self, events: &mut Events, id: CharId) -> Result<(), WorldError> {
        let ch = self.chars.release(id.0).ok_or(WorldError::NoSuchChar(id))?;
        let cancelled = events.release_owner(ch.events)?;
        log::debug!("{} left the world, {cancelled} events cancelled", ch.name);
        Ok(())
    }

    /// Damage lands at the start of the next pulse, or later in this one if
    /// called from a callback.
    pub fn hurt(&mut self, events: &mut Events, attacker: Option<CharId>, victim: CharId, damage: i32) -> Result<EventHandle, WorldError> {
        let owner = self.char_or_err(victim)?.events;
        let data = EventData::Hurt { victim, attacker, damage };
        Ok(events.schedule(EventKind::Hurt, handlers::hurt, Payload::Owned(data), Some(owner), 0)?)
    }

    pub fn purge(&mut self, events: &mut Events, ch: CharId, delay: u64) -> Result<EventHandle, WorldError> {
        let owner = self.char_or_err(ch)?.events;
        Ok(events.schedule(EventKind::Extract, handlers::extract, Payload::Borrowed(EventData::Char(ch)), Some(owner), delay)?)
    }

    pub fn has_delayed_command(&self, events: &Events, ch: CharId, cmd: &str) -> bool {
        let Some(c) = self.char(ch) else {
            return false;
        };
        events.events(c.events).any(|(_, kind, data)| {
            kind == EventKind::Command && matches!(data, EventData::Command { cmd: queued, .. } if queued == cmd)
        })
    }

    /// Feeds `cmd` to the interpreter after `delay` pulses. Unless
    /// `repeatable`, a command that is already waiting isn't queued twice.
    pub fn delayed_command(&mut self, events: &mut Events, ch: CharId, cmd: &str, delay: u64, repeatable: bool) -> Result<Option<EventHandle>, WorldError> {
        if !repeatable && self.has_delayed_command(events, ch, cmd) {
            return Ok(None);
        }
        let owner = self.char_or_err(ch)?.events;
        let data = EventData::Command { ch, cmd: cmd.to_owned() };
        Ok(Some(events.schedule(EventKind::Command, handlers::command, Payload::Owned(data), Some(owner), delay)?))
    }

    /// Starts a cast, interrupting any cast already in progress.
    pub fn start_casting(&mut self, events: &mut Events, ch: CharId, spell: &str, target: Option<CharId>, casting_time: i32) -> Result<EventHandle, WorldError> {
        if self.char_or_err(ch)?.casting.is_some() {
            self.abort_casting(events, ch)?;
        }
        let caster = self.char_or_err(ch)?;
        caster.casting = Some(Casting { spell: spell.to_owned(), target, time_left: casting_time });
        caster.submit(format!("You start chanting {spell}."));
        let owner = caster.events;
        Ok(events.schedule(EventKind::Casting, handlers::casting, Payload::Borrowed(EventData::Char(ch)), Some(owner), CAST_PULSE)?)
    }

    pub fn abort_casting(&mut self, events: &mut Events, ch: CharId) -> Result<(), WorldError> {
        let caster = self.char_or_err(ch)?;
        let owner = caster.events;
        if caster.casting.take().is_some() {
            caster.submit("You abort your spell.");
        }
        match events.cancel_by_kind(owner, EventKind::Casting) {
            Ok(_) | Err(ScheduleError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Takes back payloads the scheduler has finished with.
    pub fn reclaim(&mut self, events: &Events, released: Vec<Released<World>>) {
        for Released { kind, data } in released {
            let ch = data.subject();
            match kind {
                EventKind::Casting => {
                    // a cast cancelled behind our back leaves its state behind
                    let Some(caster) = self.chars.get_mut(ch.0) else {
                        continue;
                    };
                    if !events.has_event(caster.events, EventKind::Casting) && caster.casting.take().is_some() {
                        caster.submit("You are interrupted.");
                    }
                }
                _ => log::trace!("{kind} payload for {ch:?} handed back"),
            }
        }
    }
}
