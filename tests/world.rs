use mudserv::world::{Cooldown, EventKind, CAST_PULSE, COOLDOWN_PULSE};
use mudserv::{Config, Game};

#[test]
fn killing_a_busy_character_cancels_everything_it_had() {
    let mut game = Game::new(&Config::default());
    let ann = game.world.spawn(&mut game.events, "Ann", 40);
    let bob = game.world.spawn(&mut game.events, "Bob", 8);

    game.world.start_casting(&mut game.events, bob, "heal", Some(bob), 6).unwrap();
    game.world.set_cooldown(&mut game.events, bob, Cooldown::Bash, 20 * COOLDOWN_PULSE).unwrap();
    game.world.delayed_command(&mut game.events, bob, "flee", 30, false).unwrap();
    let bobs = game.world.char(bob).unwrap().events();
    assert_eq!(game.events.owner_len(bobs), Some(3));

    game.world.hurt(&mut game.events, Some(ann), bob, 3).unwrap();
    game.pulse().unwrap();
    assert_eq!(game.world.char(bob).unwrap().hit, 5);

    game.world.hurt(&mut game.events, Some(ann), bob, 6).unwrap();
    game.world.hurt(&mut game.events, Some(ann), bob, 6).unwrap();
    game.pulse().unwrap();
    assert!(game.world.char(bob).is_none());
    assert_eq!(game.events.owner_len(bobs), None);
    assert!(game.events.is_empty());
    // one death, even though two blows were lethal
    assert_eq!(game.world.char_mut(ann).unwrap().take_outbox(), ["Bob is dead!"]);

    game.tick_until(20 * COOLDOWN_PULSE).unwrap();
    assert_eq!(game.world.population(), 1);
}

#[test]
fn abort_then_recast() {
    let mut game = Game::new(&Config::default());
    let ann = game.world.spawn(&mut game.events, "Ann", 40);
    let owner = game.world.char(ann).unwrap().events();

    game.world.start_casting(&mut game.events, ann, "shield", None, 8).unwrap();
    game.tick_until(CAST_PULSE).unwrap();
    game.world.start_casting(&mut game.events, ann, "haste", None, 1).unwrap();
    assert_eq!(game.events.events(owner).filter(|&(_, kind, _)| kind == EventKind::Casting).count(), 1);

    game.tick_until(3 * CAST_PULSE).unwrap();
    let ann = game.world.char_mut(ann).unwrap();
    assert_eq!(ann.take_outbox(), [
        "You start chanting shield.",
        "Casting: shield ****",
        "You abort your spell.",
        "You start chanting haste.",
        "Casting: haste *",
        "You complete your haste spell.",
    ]);
    assert!(ann.casting.is_none());
    assert!(game.events.is_empty());
}
