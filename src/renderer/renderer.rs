use std::time::Instant;

use glam::Vec2;

use crate::renderer::color;
use crate::renderer::raycast::{self, Hit, HitList, HitSide};
use crate::renderer::sprites::{ProjectedSprite, draw_sprite_strip};
use crate::renderer::Rgba;
use crate::world::{Camera, MapUnitKind, Scene, SceneError, TextureBank};

/// Wall strips taller than this clip the same as a wall touching the lens;
/// keeps the texture-stepping accumulators inside `i32`.
const MAX_LINE_HEIGHT: i32 = 1 << 14;

/// Why a frame could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("scene is not renderable: {0}")]
    InvalidScene(#[from] SceneError),

    #[error("output buffer holds {got} pixels, expected {expected}")]
    BadTarget { expected: usize, got: usize },
}

/// The frame composer.
///
/// Owns the internal pixel buffer and the per-frame scratch (hit list,
/// projected sprites), so repeated frames allocate nothing.  Rendering is
/// pure given `Scene` + `Camera`: the same inputs produce a bit-identical
/// buffer.
pub struct Renderer {
    width: usize,
    height: usize,
    pub(crate) render_width: usize,
    pub(crate) render_height: usize,
    super_resolution: bool,
    pub(crate) scratch: Vec<Rgba>,
    pub(crate) sprites: Vec<ProjectedSprite>,
    hits: HitList,
}

impl Renderer {
    /// A renderer producing `width × height` frames.
    pub fn new(width: usize, height: usize) -> Self {
        let mut renderer = Self {
            width,
            height,
            render_width: width,
            render_height: height,
            super_resolution: false,
            scratch: Vec::new(),
            sprites: Vec::new(),
            hits: HitList::new(),
        };
        renderer.apply_resolution();
        renderer
    }

    /// Run the whole pipeline at half resolution and 2× nearest-neighbour
    /// blit on present.
    pub fn set_super_resolution(&mut self, enabled: bool) {
        self.super_resolution = enabled;
        self.apply_resolution();
    }

    fn apply_resolution(&mut self) {
        let (w, h) = if self.super_resolution {
            (self.width / 2, self.height / 2)
        } else {
            (self.width, self.height)
        };
        self.render_width = w.max(1);
        self.render_height = h.max(1);
        self.scratch.clear();
        self.scratch.resize(self.render_width * self.render_height, 0);
    }

    /// Horizon shift in pixels at `pitch = 1.0`: a quarter of the screen,
    /// so the shift scales with resolution.
    #[inline]
    pub(crate) fn pitch_max(&self) -> f32 {
        self.render_height as f32 / 4.0
    }

    /// Compose one frame into `out`.
    ///
    /// Returns the logical frame time in seconds (clamped to at least
    /// 1 ms), which the interactor uses for input pacing.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        bank: &TextureBank,
        out: &mut [Rgba],
    ) -> Result<f32, RenderError> {
        scene.check_valid()?;
        let expected = self.width * self.height;
        if out.len() != expected {
            return Err(RenderError::BadTarget {
                expected,
                got: out.len(),
            });
        }
        let frame_start = Instant::now();

        self.scratch.fill(0);

        let pitch_px = camera.pitch() * self.pitch_max();
        let fog_constant = (scene.map.diameter() / 2) as f32;
        let ray_begin = camera.dir - camera.plane; // column 0
        let ray_end = camera.dir + camera.plane; // last column

        if scene.skybox_enabled {
            self.render_skybox(scene, bank, pitch_px, ray_begin, ray_end);
        } else {
            self.render_ceiling(
                scene,
                bank,
                camera.pos,
                camera.z,
                pitch_px,
                fog_constant,
                ray_begin,
                ray_end,
            );
        }
        self.render_floor(
            scene,
            bank,
            camera.pos,
            camera.z,
            pitch_px,
            fog_constant,
            ray_begin,
            ray_end,
        );

        self.project_sprites(scene, camera, pitch_px, fog_constant, bank);

        let mut sprites = std::mem::take(&mut self.sprites);
        let mut hits = std::mem::take(&mut self.hits);
        for x in 0..self.render_width {
            let ray = camera.ray(x, self.render_width);
            let far = raycast::cast_column(&scene.map, camera.pos, ray, &mut hits);
            self.composite_column(
                x,
                ray,
                &hits,
                far,
                &mut sprites,
                scene,
                camera,
                bank,
                pitch_px,
                fog_constant,
            );
        }
        self.hits = hits;
        self.sprites = sprites;

        self.present(out);

        Ok(frame_start.elapsed().as_secs_f32().max(0.001))
    }

    /// Layer one column: walk the hits back-to-front, interleaving sprite
    /// strips by depth, then drain the sprites nearer than the closest hit.
    #[allow(clippy::too_many_arguments)]
    fn composite_column(
        &mut self,
        x: usize,
        ray: Vec2,
        hits: &[Hit],
        far: f32,
        sprites: &mut [ProjectedSprite],
        scene: &Scene,
        camera: &Camera,
        bank: &TextureBank,
        pitch_px: f32,
        fog_constant: f32,
    ) {
        let rw = self.render_width;
        let rh = self.render_height as i32;
        let fog = scene.fog;

        // sprites beyond the terminal hit stay hidden for this column
        let mut pending = sprites.len();
        while pending > 0 && sprites[pending - 1].transform_y > far {
            pending -= 1;
        }

        for hit in hits.iter().rev() {
            while pending > 0 && sprites[pending - 1].transform_y > hit.perp_dist {
                let spr = &mut sprites[pending - 1];
                let tex = bank.texture_or_missing(spr.texture);
                draw_sprite_strip(
                    &mut self.scratch,
                    rw,
                    spr,
                    x as i32,
                    tex,
                    fog.enabled,
                    fog.color,
                );
                pending -= 1;
            }

            let tex = bank.texture_or_missing(hit.texture);
            let tw = tex.w as i32;
            let th = tex.h as i32;

            let line_height = ((rh as f32 / hit.perp_dist) as i32).min(MAX_LINE_HEIGHT);
            let lift = pitch_px + camera.z / hit.perp_dist;
            let mut draw_start = ((-(line_height / 2) + rh / 2) as f32 + lift) as i32;
            let mut draw_end = ((line_height / 2 + rh / 2) as f32 + lift) as i32;

            let mut tex_x = (hit.wall_x * tw as f32) as i32;
            if hit.kind == MapUnitKind::Door {
                // the panel slides sideways; columns past its edge are the
                // open part of the doorway
                let offset = hit
                    .door
                    .and_then(|id| scene.map.door(id))
                    .map_or(tw as f32, |d| d.offset);
                tex_x = (tex_x as f32 - (tw as f32 - offset)) as i32;
                if tex_x < 0 {
                    continue;
                }
            }
            if (hit.side == HitSide::Ns && ray.x > 0.0)
                || (hit.side == HitSide::Ew && ray.y < 0.0)
            {
                tex_x = tw - tex_x - 1;
            }
            let tex_x = tex_x.clamp(0, tw - 1) as usize;

            let f = if fog.enabled {
                hit.perp_dist / fog_constant * fog.level
            } else {
                0.0
            };

            let delta_y = draw_end - draw_start;
            if delta_y <= 0 {
                continue;
            }
            let mut count = 0;
            let mut tex_y = 0i32;
            if draw_start < 0 {
                count = -draw_start * th;
                if count > delta_y {
                    tex_y += count / delta_y;
                    count %= delta_y;
                }
                draw_start = 0;
            }
            if draw_end >= rh {
                draw_end = rh - 1;
            }

            let glass = hit.kind == MapUnitKind::Glass;
            for y in draw_start..=draw_end {
                let texel = tex.pixels[tex_y.min(th - 1) as usize * tex.w + tex_x];
                if color::is_opaque(texel) {
                    let mut c = match hit.side {
                        HitSide::Ns => color::halve(texel),
                        HitSide::Diag => color::quarter(texel),
                        HitSide::Ew => texel,
                    };
                    if fog.enabled {
                        c = color::fog_mix(c, fog.color, f);
                    }
                    let px = &mut self.scratch[y as usize * rw + x];
                    if glass {
                        c = color::blend_half(c, *px);
                    }
                    *px = c;
                }
                count += th;
                while count > delta_y {
                    tex_y += 1;
                    count -= delta_y;
                }
            }
        }

        // everything left is nearer than the closest wall
        while pending > 0 {
            let spr = &mut sprites[pending - 1];
            let tex = bank.texture_or_missing(spr.texture);
            draw_sprite_strip(
                &mut self.scratch,
                rw,
                spr,
                x as i32,
                tex,
                fog.enabled,
                fog.color,
            );
            pending -= 1;
        }
    }

    fn present(&self, out: &mut [Rgba]) {
        if !self.super_resolution {
            out.copy_from_slice(&self.scratch);
            return;
        }
        let rw = self.render_width;
        let rh = self.render_height;
        for y in 0..self.height {
            let sy = (y / 2).min(rh - 1);
            let src = &self.scratch[sy * rw..(sy + 1) * rw];
            let dst = &mut out[y * self.width..(y + 1) * self.width];
            for (x, px) in dst.iter_mut().enumerate() {
                *px = src[(x / 2).min(rw - 1)];
            }
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{DoorState, Map, MapUnit, Sprite, Texture};
    use glam::vec2;

    const WALL: u32 = 0xFF_AA6633;
    const GLASS: u32 = 0xFF_4080C0;
    const FLOOR: u32 = 0xFF_208020;
    const CEIL: u32 = 0xFF_202080;
    const SPRITE: u32 = 0xFF_00FF00;

    struct Fixture {
        scene: Scene,
        bank: TextureBank,
    }

    fn fixture(units: Vec<MapUnit>, w: usize, h: usize, doors: Vec<DoorState>) -> Fixture {
        let mut bank = TextureBank::default_with_checker();
        // ids 1..: wall, glass, floor, ceiling, sprite, door
        bank.insert("WALL", Texture::solid(16, 16, WALL)).unwrap();
        bank.insert("GLASS", Texture::solid(16, 16, GLASS)).unwrap();
        let floor = bank.insert("FLOOR", Texture::solid(16, 16, FLOOR)).unwrap();
        let ceil = bank.insert("CEIL", Texture::solid(16, 16, CEIL)).unwrap();
        bank.insert("SPRITE", Texture::solid(16, 16, SPRITE)).unwrap();
        bank.insert("DOOR", Texture::solid(64, 64, 0xFF_886644)).unwrap();

        let map = Map::new(w, h, units, doors).unwrap();
        let mut scene = Scene::new(map);
        scene.set_floor_texture(floor);
        scene.set_ceiling_texture(ceil);
        Fixture { scene, bank }
    }

    fn empty_room() -> Fixture {
        let mut units = Vec::with_capacity(25);
        for y in 0..5 {
            for x in 0..5 {
                units.push(if x == 0 || y == 0 || x == 4 || y == 4 {
                    MapUnit::wall(1)
                } else {
                    MapUnit::air()
                });
            }
        }
        fixture(units, 5, 5, Vec::new())
    }

    #[test]
    fn every_pixel_is_written() {
        let f = empty_room();
        let camera = Camera::new(vec2(2.5, 2.5), vec2(-1.0, 0.0));
        let mut renderer = Renderer::new(64, 48);
        let mut out = vec![0xDEADBEEFu32; 64 * 48];
        renderer.render(&f.scene, &camera, &f.bank, &mut out).unwrap();
        assert!(out.iter().all(|&c| c != 0xDEADBEEF));
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut f = empty_room();
        f.scene.enable_fog(true);
        f.scene.set_fog_color(0x334455);
        f.scene.set_fog_level(2.0);
        let mut camera = Camera::new(vec2(2.2, 2.7), vec2(-0.8, 0.6));
        camera.add_pitch(0.3);
        camera.z = -20.0;

        let mut renderer = Renderer::new(64, 48);
        let mut a = vec![0u32; 64 * 48];
        let mut b = vec![1u32; 64 * 48];
        renderer.render(&f.scene, &camera, &f.bank, &mut a).unwrap();
        renderer.render(&f.scene, &camera, &f.bank, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_scene_refused() {
        let map = Map::new(3, 3, vec![MapUnit::wall(1); 9], Vec::new()).unwrap();
        let scene = Scene::new(map); // no textures wired
        let camera = Camera::new(vec2(1.5, 1.5), vec2(1.0, 0.0));
        let mut renderer = Renderer::new(8, 8);
        let mut out = vec![0u32; 64];
        assert!(matches!(
            renderer.render(&scene, &camera, &bank_stub(), &mut out),
            Err(RenderError::InvalidScene(_))
        ));
    }

    #[test]
    fn wrong_target_size_refused() {
        let f = empty_room();
        let camera = Camera::new(vec2(2.5, 2.5), vec2(-1.0, 0.0));
        let mut renderer = Renderer::new(64, 48);
        let mut out = vec![0u32; 10];
        assert!(matches!(
            renderer.render(&f.scene, &camera, &f.bank, &mut out),
            Err(RenderError::BadTarget { .. })
        ));
    }

    fn bank_stub() -> TextureBank {
        TextureBank::default_with_checker()
    }

    #[test]
    fn glass_blends_fifty_fifty_over_the_wall() {
        let mut units = vec![MapUnit::air(); 25];
        units[2 * 5] = MapUnit::wall(1); // (0, 2)
        units[2 * 5 + 1] = MapUnit::glass(2); // (1, 2)
        let f = fixture(units, 5, 5, Vec::new());

        let camera = Camera::new(vec2(2.5, 2.5), vec2(-1.0, 0.0));
        let mut renderer = Renderer::new(64, 48);
        let mut out = vec![0u32; 64 * 48];
        renderer.render(&f.scene, &camera, &f.bank, &mut out).unwrap();

        // both surfaces face north-south, so both are half-shaded before
        // the glass averages itself over the wall pixel
        let wall_shaded = color::halve(WALL);
        let expected = color::blend_half(color::halve(GLASS), wall_shaded);
        assert_eq!(out[24 * 64 + 32], expected);
    }

    #[test]
    fn sprite_hidden_behind_near_wall_shown_before_far_wall() {
        // wall column at x = 0; everything else air
        let room = |w: usize| {
            let mut units = vec![MapUnit::air(); w * 5];
            for y in 0..5 {
                units[y * w] = MapUnit::wall(1);
            }
            units
        };

        // camera 2.2 cells from the wall, sprite 4 deep: occluded
        let mut f = fixture(room(5), 5, 5, Vec::new());
        f.scene.sprites.push(Sprite::new(5, 3.2 - 4.0, 1.5));
        let camera = Camera::new(vec2(3.2, 1.5), vec2(-1.0, 0.0));
        let mut renderer = Renderer::new(64, 48);
        let mut out = vec![0u32; 64 * 48];
        renderer.render(&f.scene, &camera, &f.bank, &mut out).unwrap();
        assert_eq!(out[24 * 64 + 32], color::halve(WALL));

        // camera further back: the same depth-4 sprite now sits in front
        // of the (now deeper) wall and must cover it
        let mut f = fixture(room(9), 9, 5, Vec::new());
        f.scene.sprites.push(Sprite::new(5, 6.2 - 4.0, 1.5));
        let camera = Camera::new(vec2(6.2, 1.5), vec2(-1.0, 0.0));
        let mut out = vec![0u32; 64 * 48];
        renderer.render(&f.scene, &camera, &f.bank, &mut out).unwrap();
        assert_eq!(out[24 * 64 + 32], SPRITE);
    }

    #[test]
    fn closed_door_renders_open_door_shows_through() {
        let units_with_door = || {
            let mut units = vec![MapUnit::air(); 25];
            units[2 * 5] = MapUnit::wall(1); // (0, 2) backstop
            units[2 * 5 + 1] = MapUnit::door(6, 0); // (1, 2)
            units
        };
        let camera = Camera::new(vec2(2.5, 2.5), vec2(-1.0, 0.0));
        let mut renderer = Renderer::new(64, 48);
        let mut out = vec![0u32; 64 * 48];

        let f = fixture(units_with_door(), 5, 5, vec![DoorState::new(64)]);
        renderer.render(&f.scene, &camera, &f.bank, &mut out).unwrap();
        assert_eq!(out[24 * 64 + 32], color::halve(0xFF_886644));

        let mut open = DoorState::new(64);
        open.offset = open.min;
        let f = fixture(units_with_door(), 5, 5, vec![open]);
        renderer.render(&f.scene, &camera, &f.bank, &mut out).unwrap();
        // centre of the doorway is the retracted part: the wall behind
        // shows through
        assert_eq!(out[24 * 64 + 32], color::halve(WALL));
    }

    #[test]
    fn super_resolution_covers_odd_sized_targets() {
        let f = empty_room();
        let camera = Camera::new(vec2(2.5, 2.5), vec2(-1.0, 0.0));
        let mut renderer = Renderer::new(65, 49);
        renderer.set_super_resolution(true);
        let mut out = vec![0xDEADBEEFu32; 65 * 49];
        renderer.render(&f.scene, &camera, &f.bank, &mut out).unwrap();
        assert!(out.iter().all(|&c| c != 0xDEADBEEF));
    }
}
