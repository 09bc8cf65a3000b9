//! Key bindings and held-input state.

use std::collections::HashMap;

use bitflags::bitflags;

/// What a bound key does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    Sneak,
    Sprint,
    Interact,
}

bitflags! {
    /// Direction keys currently held down.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MoveKeys: u8 {
        const FORWARD = 1 << 0;
        const BACK = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

/// Movement stance as an explicit state machine, so releasing one
/// modifier never clobbers the other's effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stance {
    #[default]
    Normal,
    Sneaking,
    Sprinting,
}

impl Stance {
    /// Multiplier applied to the nominal move speed.
    #[inline]
    pub fn speed_factor(self) -> f32 {
        match self {
            Stance::Normal => 1.0,
            Stance::Sneaking => 0.3,
            Stance::Sprinting => 2.0,
        }
    }
}

/// Remappable `keycode → Action` table.
///
/// Key codes are host-defined; the default table uses ASCII letters plus
/// the classic virtual-key codes 16 (shift) and 17 (ctrl).  Unbound codes
/// are simply ignored.
pub struct KeyBindings {
    map: HashMap<u32, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(u32::from('W'), Action::Forward);
        map.insert(u32::from('S'), Action::Back);
        map.insert(u32::from('A'), Action::StrafeLeft);
        map.insert(u32::from('D'), Action::StrafeRight);
        map.insert(17, Action::Sneak);
        map.insert(16, Action::Sprint);
        map.insert(u32::from('F'), Action::Interact);
        Self { map }
    }
}

impl KeyBindings {
    /// Bind `code` to `action`, replacing any previous binding.
    pub fn bind(&mut self, code: u32, action: Action) {
        self.map.insert(code, action);
    }

    pub fn unbind(&mut self, code: u32) {
        self.map.remove(&code);
    }

    #[inline]
    pub fn action(&self, code: u32) -> Option<Action> {
        self.map.get(&code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_and_remap() {
        let mut binds = KeyBindings::default();
        assert_eq!(binds.action(u32::from('W')), Some(Action::Forward));
        assert_eq!(binds.action(17), Some(Action::Sneak));
        assert_eq!(binds.action(0xFFFF), None);

        binds.bind(u32::from('E'), Action::Interact);
        assert_eq!(binds.action(u32::from('E')), Some(Action::Interact));
        binds.unbind(u32::from('W'));
        assert_eq!(binds.action(u32::from('W')), None);
    }

    #[test]
    fn stance_factors() {
        assert_eq!(Stance::Normal.speed_factor(), 1.0);
        assert_eq!(Stance::Sneaking.speed_factor(), 0.3);
        assert_eq!(Stance::Sprinting.speed_factor(), 2.0);
    }
}
