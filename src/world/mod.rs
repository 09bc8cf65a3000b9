mod camera;
mod map;
mod scene;
mod sprite;
mod texture;

pub use camera::{Camera, CameraError, DEFAULT_PLANE_RATIO};
pub use map::{DOOR_SPEED, DoorId, DoorPhase, DoorState, Map, MapError, MapUnit, MapUnitKind};
pub use scene::{Fog, Scene, SceneError};
pub use sprite::{Sprite, SpriteId, TriggerAction};
pub use texture::{NO_TEXTURE, Texture, TextureBank, TextureError, TextureId};
