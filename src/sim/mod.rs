mod input;
mod interactor;

pub use input::{Action, KeyBindings, MoveKeys, Stance};
pub use interactor::{Interactor, SNEAK_Z};
