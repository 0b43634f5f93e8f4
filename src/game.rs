use crate::prelude::*;
use crate::config::Config;
use crate::scheduler::{Scheduler, TickError};
use crate::world::{Events, World, PULSES_PER_SEC};

/// The world together with the events that drive it.
#[derive(Debug)]
pub struct Game {
    pub world: World,
    pub events: Events,
}

impl Game {
    pub fn new(config: &Config) -> Self {
        Self {
            world: World::new(),
            events: Scheduler::new(&config.scheduler),
        }
    }
    /// The last pulse that has been run.
    pub fn now(&self) -> u64 {
        self.events.now()
    }
    pub fn next_tick(&self) -> u64 {
        self.events.next_tick()
    }

    /// Runs one pulse and takes back whatever payloads it released.
    pub fn pulse(&mut self) -> Result<usize, TickError> {
        let result = self.events.tick(self.next_tick(), &mut self.world);
        let released = self.events.take_released();
        self.world.reclaim(&self.events, released);
        let now = self.now();
        if now % (60 * PULSES_PER_SEC) == 0 {
            let casting = self.world.characters().filter(|(_, c)| c.casting.is_some()).count();
            log::debug!(
                "pulse {now}: {} characters ({casting} casting), {} events pending",
                self.world.population(),
                self.events.pending(),
            );
        }
        result
    }

    pub fn tick_until(&mut self, target: u64) -> Result<usize, TickError> {
        let mut fired = 0;
        while self.now() < target {
            fired += self.pulse()?;
        }
        Ok(fired)
    }

    /// Wall-clock time at which `pulse` is due, counted from `start`.
    pub fn due_at(start: time::Instant, pulse_len: time::Duration, pulse: u64) -> time::Instant {
        start + pulse_len * u32::try_from(pulse).unwrap_or(u32::MAX)
    }
}
