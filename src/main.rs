use mudserv::{Config, Game};
use std::time::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let mut args = std::env::args_os();

    let config = match args.nth(1) {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    let pulse = config.pulse();
    let mut game = Game::new(&config);
    log::info!("running at {}ms per pulse", config.pulse_millis);

    let starttime = Instant::now();
    loop {
        if config.max_pulses.map_or(false, |max| game.now() >= max) {
            log::info!("stopping after {} pulses", game.now());
            return Ok(());
        }
        let next_pulse_due = Game::due_at(starttime, pulse, game.next_tick());
        let now = Instant::now();
        if next_pulse_due > now {
            std::thread::sleep(next_pulse_due - now);
        }

        let pulses_passed = (starttime.elapsed().as_millis() / pulse.as_millis()) as u64;
        let target = match config.max_pulses {
            Some(max) => pulses_passed.min(max),
            None => pulses_passed,
        };
        let behind = target.saturating_sub(game.next_tick());
        if behind > 0 {
            log::warn!("running {behind} pulses behind");
        }
        game.tick_until(target)?;
    }
}
