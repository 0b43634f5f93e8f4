use super::*;
use crate::scheduler::{Fire, Outcome};

/// Longest progress bar shown while casting.
const MAX_CAST_STARS: i32 = 20;

pub(super) fn command(fire: &mut Fire<'_, World>, data: &mut EventData) -> Outcome {
    if let EventData::Command { ch, cmd } = data {
        if let Some(c) = fire.host.char_mut(*ch) {
            c.input.push_back(core::mem::take(cmd));
        }
    }
    Outcome::Finished
}

pub(super) fn hurt(fire: &mut Fire<'_, World>, data: &mut EventData) -> Outcome {
    let EventData::Hurt { victim, attacker, damage } = *data else {
        return Outcome::Finished;
    };
    let Some(ch) = fire.host.char_mut(victim) else {
        return Outcome::Finished;
    };
    ch.hit = ch.hit.saturating_sub(damage);
    if ch.hit > 0 {
        ch.submit(format!("You take {damage} damage."));
        return Outcome::Finished;
    }
    let owner = ch.events;
    if !fire.scheduler.has_event(owner, EventKind::Die) {
        let death = EventData::Die { ch: victim, killer: attacker };
        if let Err(e) = fire.scheduler.schedule(EventKind::Die, die, Payload::Owned(death), Some(owner), 0) {
            log::warn!("{} can't die: {e}", ch.name);
        }
    }
    Outcome::Finished
}

/// The only way a character dies.
pub(super) fn die(fire: &mut Fire<'_, World>, data: &mut EventData) -> Outcome {
    let EventData::Die { ch, killer } = *data else {
        return Outcome::Finished;
    };
    let name = match fire.host.char(ch) {
        Some(c) => c.name.clone(),
        None => return Outcome::Finished,
    };
    // the killer may have left the game since the blow landed
    match killer.and_then(|k| fire.host.char_mut(k)) {
        Some(killer) => killer.submit(format!("{name} is dead!")),
        None => log::debug!("{name} died without a killer"),
    }
    if let Err(e) = fire.host.extract_char(fire.scheduler, ch) {
        log::warn!("extracting {name}: {e}");
    }
    Outcome::Finished
}

pub(super) fn extract(fire: &mut Fire<'_, World>, data: &mut EventData) -> Outcome {
    if let Err(e) = fire.host.extract_char(fire.scheduler, data.subject()) {
        log::debug!("purge: {e}");
    }
    Outcome::Finished
}

pub(super) fn casting(fire: &mut Fire<'_, World>, data: &mut EventData) -> Outcome {
    let ch = data.subject();
    let world = &mut *fire.host;
    let Some(cast) = world.char(ch).and_then(|c| c.casting.clone()) else {
        return Outcome::Finished;
    };
    let target_gone = cast.target.map_or(false, |t| world.char(t).is_none());
    let Some(caster) = world.char_mut(ch) else {
        return Outcome::Finished;
    };
    if target_gone {
        caster.casting = None;
        caster.submit("You abort your spell.");
        return Outcome::Finished;
    }
    if cast.time_left <= 0 {
        caster.casting = None;
        caster.submit(format!("You complete your {} spell.", cast.spell));
        return Outcome::Finished;
    }
    let stars = "*".repeat((cast.time_left / 2 + cast.time_left % 2).min(MAX_CAST_STARS) as usize);
    caster.submit(format!("Casting: {} {stars}", cast.spell));
    if let Some(casting) = &mut caster.casting {
        casting.time_left -= 2;
    }
    Outcome::Reschedule(CAST_PULSE)
}
