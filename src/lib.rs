mod collections;
pub mod config;
pub mod game;
pub mod scheduler;
pub mod world;

pub use config::Config;
pub use game::Game;
pub use scheduler::Scheduler;
pub use world::World;

mod prelude {
    pub(crate) use crate::collections::*;
    pub(crate) use std::{fmt, io, time};
}
