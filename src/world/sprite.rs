use crate::world::texture::TextureId;

/// Stable index into [`crate::world::Scene`]'s sprite list.
pub type SpriteId = u16;

/// What an interactable sprite does when the player gets close.
///
/// Kept data-only so the core never holds callbacks; `Custom` ids are
/// handed back to the host from the trigger pass and resolved there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerAction {
    None,
    MoveBy { dx: f32, dy: f32 },
    Teleport { x: f32, y: f32 },
    Custom(u32),
}

/// A world-anchored billboard.
///
/// `z` is a vertical screen offset scaled by depth, like the camera's own
/// `z`.  Sprite textures are assumed square; non-square panels render with
/// the width stretched to the height.
#[derive(Clone, Copy, Debug)]
pub struct Sprite {
    pub texture: TextureId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub interactable: bool,
    pub trigger_range: f32,
    pub action: TriggerAction,
}

impl Sprite {
    /// Plain decoration at `(x, y)`: not interactable, no offset.
    pub fn new(texture: TextureId, x: f32, y: f32) -> Self {
        Self {
            texture,
            x,
            y,
            z: 0.0,
            interactable: false,
            trigger_range: 0.0,
            action: TriggerAction::None,
        }
    }
}
