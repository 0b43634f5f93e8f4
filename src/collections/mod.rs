mod slotmap;

pub use slotmap::{Key, SlotMap};
