use crate::world::map::Map;
use crate::world::sprite::Sprite;
use crate::world::texture::TextureId;

/// Uniform depth fog.  `color` is an `0x00RRGGBB` triple; `level` scales
/// how quickly distance saturates to it (normalized by the map size, so a
/// given level looks the same on any map).
#[derive(Clone, Copy, Debug)]
pub struct Fog {
    pub enabled: bool,
    pub color: u32,
    pub level: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            enabled: false,
            color: 0x000000,
            level: 1.0,
        }
    }
}

/// The renderable world: the map, the backdrop textures, fog and the
/// sprite list.
///
/// A scene starts with skybox and fog disabled, like an empty stage; the
/// host wires in textures and calls [`Scene::check_valid`] before the
/// render loop starts.
pub struct Scene {
    pub map: Map,
    pub sprites: Vec<Sprite>,
    pub(crate) floor: Option<TextureId>,
    pub(crate) ceiling: Option<TextureId>,
    pub(crate) skybox: Option<TextureId>,
    pub(crate) fog: Fog,
    pub(crate) skybox_enabled: bool,
    pub(crate) skybox_repeats: u16,
}

/// Why a scene cannot be rendered.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene has no floor texture")]
    MissingFloor,

    #[error("scene has no ceiling texture and the skybox is disabled")]
    MissingCeiling,

    #[error("skybox is enabled but no skybox texture is set")]
    MissingSkybox,
}

impl Scene {
    pub fn new(map: Map) -> Self {
        Self {
            map,
            sprites: Vec::new(),
            floor: None,
            ceiling: None,
            skybox: None,
            fog: Fog::default(),
            skybox_enabled: false,
            skybox_repeats: 1,
        }
    }

    pub fn set_floor_texture(&mut self, id: TextureId) {
        self.floor = Some(id);
    }

    pub fn set_ceiling_texture(&mut self, id: TextureId) {
        self.ceiling = Some(id);
    }

    pub fn set_skybox_texture(&mut self, id: TextureId) {
        self.skybox = Some(id);
    }

    /// Enabling the skybox replaces the ceiling pass.
    pub fn enable_skybox(&mut self, enabled: bool) {
        self.skybox_enabled = enabled;
    }

    /// How many times the panorama wraps around a full turn.
    pub fn set_skybox_repeats(&mut self, repeats: u16) {
        self.skybox_repeats = repeats.max(1);
    }

    pub fn enable_fog(&mut self, enabled: bool) {
        self.fog.enabled = enabled;
    }

    pub fn set_fog_color(&mut self, color: u32) {
        self.fog.color = color & 0x00FF_FFFF;
    }

    pub fn set_fog_level(&mut self, level: f32) {
        self.fog.level = level;
    }

    #[inline]
    pub fn fog(&self) -> Fog {
        self.fog
    }

    /// A renderable scene has a floor and either a ceiling or an enabled,
    /// textured skybox.  The renderer refuses to draw until this passes.
    pub fn check_valid(&self) -> Result<(), SceneError> {
        if self.floor.is_none() {
            return Err(SceneError::MissingFloor);
        }
        if self.skybox_enabled {
            if self.skybox.is_none() {
                return Err(SceneError::MissingSkybox);
            }
        } else if self.ceiling.is_none() {
            return Err(SceneError::MissingCeiling);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::map::MapUnit;

    fn empty_map() -> Map {
        Map::new(3, 3, vec![MapUnit::wall(0); 9], Vec::new()).unwrap()
    }

    #[test]
    fn validity_follows_backdrop_choice() {
        let mut scene = Scene::new(empty_map());
        assert_eq!(scene.check_valid(), Err(SceneError::MissingFloor));

        scene.set_floor_texture(1);
        assert_eq!(scene.check_valid(), Err(SceneError::MissingCeiling));

        scene.set_ceiling_texture(2);
        assert_eq!(scene.check_valid(), Ok(()));

        // switching to a skybox re-validates against the sky texture
        scene.enable_skybox(true);
        assert_eq!(scene.check_valid(), Err(SceneError::MissingSkybox));
        scene.set_skybox_texture(3);
        assert_eq!(scene.check_valid(), Ok(()));
    }

    #[test]
    fn fog_color_is_rgb_only() {
        let mut scene = Scene::new(empty_map());
        scene.set_fog_color(0xFF80_4020);
        assert_eq!(scene.fog().color, 0x0080_4020);
    }
}
