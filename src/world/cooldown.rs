//! Named cooldowns, counted down by a single recurring event per character.
//!
//! A character with any cooldown running has exactly one `cooldown` event.
//! Each firing takes `COOLDOWN_PULSE` off every timer and re-arms itself
//! while anything is left. Setting a cooldown on a character without the
//! event queues a new one.
use super::*;
use crate::scheduler::{Fire, Outcome};

/// Interval of the decrement event, and how much each firing takes off.
pub const COOLDOWN_PULSE: u64 = PULSES_PER_SEC;
const COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cooldown {
    Backstab,
    Bash,
    InstantKill,
    Disarm,
    FumblingPrimary,
    DroppedPrimary,
    FumblingSecondary,
    DroppedSecondary,
    SummonMount,
    LayHands,
    FirstAid,
    EyeGouge,
    Throatcut,
    Shapechange,
    Chant,
    Breathe,
}
impl Cooldown {
    pub const ALL: [Cooldown; COUNT] = [
        Cooldown::Backstab,
        Cooldown::Bash,
        Cooldown::InstantKill,
        Cooldown::Disarm,
        Cooldown::FumblingPrimary,
        Cooldown::DroppedPrimary,
        Cooldown::FumblingSecondary,
        Cooldown::DroppedSecondary,
        Cooldown::SummonMount,
        Cooldown::LayHands,
        Cooldown::FirstAid,
        Cooldown::EyeGouge,
        Cooldown::Throatcut,
        Cooldown::Shapechange,
        Cooldown::Chant,
        Cooldown::Breathe,
    ];
    pub fn name(self) -> &'static str {
        match self {
            Cooldown::Backstab => "backstab",
            Cooldown::Bash => "bash",
            Cooldown::InstantKill => "instant kill",
            Cooldown::Disarm => "disarm",
            Cooldown::FumblingPrimary => "fumbling primary weapon",
            Cooldown::DroppedPrimary => "dropped primary weapon",
            Cooldown::FumblingSecondary => "fumbling secondary weapon",
            Cooldown::DroppedSecondary => "dropped secondary weapon",
            Cooldown::SummonMount => "summon mount",
            Cooldown::LayHands => "lay hands",
            Cooldown::FirstAid => "first aid",
            Cooldown::EyeGouge => "eye gouge",
            Cooldown::Throatcut => "throatcut",
            Cooldown::Shapechange => "shapechange",
            Cooldown::Chant => "chant",
            Cooldown::Breathe => "breathe",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Timer {
    remaining: u64,
    max: u64,
}

/// Remaining and starting pulses for every named cooldown.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cooldowns {
    timers: [Timer; COUNT],
}
impl Cooldowns {
    pub fn remaining(&self, cd: Cooldown) -> u64 {
        self.timers[cd as usize].remaining
    }
    /// What the cooldown was last set to. Kept after it runs out.
    pub fn max(&self, cd: Cooldown) -> u64 {
        self.timers[cd as usize].max
    }
    pub fn is_active(&self, cd: Cooldown) -> bool {
        self.remaining(cd) > 0
    }
    pub fn any_active(&self) -> bool {
        self.timers.iter().any(|t| t.remaining > 0)
    }
    pub fn active(&self) -> impl Iterator<Item = (Cooldown, u64)> + '_ {
        Cooldown::ALL.into_iter()
            .map(|cd| (cd, self.remaining(cd)))
            .filter(|&(_, left)| left > 0)
    }
    pub fn set(&mut self, cd: Cooldown, pulses: u64) {
        self.timers[cd as usize] = Timer { remaining: pulses, max: pulses };
    }
    pub fn clear(&mut self, cd: Cooldown) {
        self.timers[cd as usize].remaining = 0;
    }
    /// Takes `pulses` off every timer. Returns whether any are still running.
    pub fn elapse(&mut self, pulses: u64) -> bool {
        for timer in &mut self.timers {
            timer.remaining = timer.remaining.saturating_sub(pulses);
        }
        self.any_active()
    }
}

impl World {
    pub fn cooldown(&self, ch: CharId, cd: Cooldown) -> Option<u64> {
        self.char(ch).map(|c| c.cooldowns.remaining(cd))
    }

    /// Ages every cooldown by time spent away, e.g. a player reconnecting.
    /// Drops the decrement event if nothing is left running.
    pub fn age_cooldowns(&mut self, events: &mut Events, ch: CharId, pulses: u64) -> Result<(), WorldError> {
        let c = self.char_or_err(ch)?;
        if c.cooldowns.elapse(pulses) {
            return Ok(());
        }
        let owner = c.events;
        stop_decrementing(events, owner)
    }

    pub fn set_cooldown(&mut self, events: &mut Events, ch: CharId, cd: Cooldown, pulses: u64) -> Result<(), WorldError> {
        let c = self.char_or_err(ch)?;
        c.cooldowns.set(cd, pulses);
        let owner = c.events;
        if pulses == 0 || events.has_event(owner, EventKind::Cooldown) {
            return Ok(());
        }
        events.schedule(EventKind::Cooldown, decrement, Payload::Borrowed(EventData::Char(ch)), Some(owner), COOLDOWN_PULSE)?;
        Ok(())
    }

    pub fn clear_cooldown(&mut self, events: &mut Events, ch: CharId, cd: Cooldown) -> Result<(), WorldError> {
        let c = self.char_or_err(ch)?;
        c.cooldowns.clear(cd);
        if c.cooldowns.any_active() {
            return Ok(());
        }
        let owner = c.events;
        stop_decrementing(events, owner)
    }

    pub fn clear_cooldowns(&mut self, events: &mut Events, ch: CharId) -> Result<(), WorldError> {
        let c = self.char_or_err(ch)?;
        for cd in Cooldown::ALL {
            c.cooldowns.clear(cd);
        }
        let owner = c.events;
        stop_decrementing(events, owner)
    }
}

fn stop_decrementing(events: &mut Events, owner: OwnerId) -> Result<(), WorldError> {
    match events.cancel_by_kind(owner, EventKind::Cooldown) {
        Ok(_) | Err(ScheduleError::NotFound(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn decrement(fire: &mut Fire<'_, World>, data: &mut EventData) -> Outcome {
    let Some(c) = fire.host.char_mut(data.subject()) else {
        return Outcome::Finished;
    };
    if c.cooldowns.elapse(COOLDOWN_PULSE) {
        Outcome::Reschedule(COOLDOWN_PULSE)
    } else {
        Outcome::Finished
    }
}
