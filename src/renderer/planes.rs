//! Floor and ceiling casting: horizontal scanlines mapped back into the
//! grid through the camera plane.

use glam::Vec2;

use crate::renderer::color;
use crate::renderer::renderer::Renderer;
use crate::world::{Scene, TextureBank};

impl Renderer {
    /// Rows below the horizon sample the floor texture.
    ///
    /// `ray_begin`/`ray_end` are the rays through the first and last screen
    /// column; each row interpolates the world position between them.
    pub(crate) fn render_floor(
        &mut self,
        scene: &Scene,
        bank: &TextureBank,
        pos: Vec2,
        cam_z: f32,
        pitch_px: f32,
        fog_constant: f32,
        ray_begin: Vec2,
        ray_end: Vec2,
    ) {
        let tex = bank.texture_or_missing(scene.floor.unwrap_or_default());
        let w = self.render_width;
        let h = self.render_height as i32;
        let fog = scene.fog;

        let eye = self.render_height as f32 * 0.5 + cam_z;
        let y0 = ((self.render_height / 2) as f32 + pitch_px + 1.0) as i32;

        let mut relative = 0;
        for y in y0.max(0)..h {
            relative += 1;
            let dist = eye / relative as f32;
            let step = (ray_end - ray_begin) * (dist / w as f32);
            let mut world = pos + ray_begin * dist;
            let f = if fog.enabled {
                dist / fog_constant * fog.level
            } else {
                0.0
            };

            let row = y as usize * w;
            for x in 0..w {
                let tx = ((world.x - world.x.floor()) * tex.w as f32) as usize % tex.w;
                let ty = ((world.y - world.y.floor()) * tex.h as f32) as usize % tex.h;
                world += step;

                let mut c = tex.pixels[ty * tex.w + tx];
                if fog.enabled {
                    c = color::fog_mix(c, fog.color, f);
                }
                self.scratch[row + x] = color::halve(c);
            }
        }
    }

    /// Rows above the horizon sample the ceiling, mirroring the floor walk
    /// with the eye height reflected.  Replaced by the skybox when enabled.
    pub(crate) fn render_ceiling(
        &mut self,
        scene: &Scene,
        bank: &TextureBank,
        pos: Vec2,
        cam_z: f32,
        pitch_px: f32,
        fog_constant: f32,
        ray_begin: Vec2,
        ray_end: Vec2,
    ) {
        let tex = bank.texture_or_missing(scene.ceiling.unwrap_or_default());
        let w = self.render_width;
        let fog = scene.fog;

        let eye = self.render_height as f32 * 0.5 - cam_z;
        let y0 = ((self.render_height / 2) as f32 + pitch_px + 1.0) as i32;

        let mut relative = 0;
        let mut y = y0.min(self.render_height as i32 - 1);
        while y >= 0 {
            relative += 1;
            let dist = eye / relative as f32;
            let step = (ray_end - ray_begin) * (dist / w as f32);
            let mut world = pos + ray_begin * dist;
            let f = if fog.enabled {
                dist / fog_constant * fog.level
            } else {
                0.0
            };

            let row = y as usize * w;
            for x in 0..w {
                let tx = ((world.x - world.x.floor()) * tex.w as f32) as usize % tex.w;
                let ty = ((world.y - world.y.floor()) * tex.h as f32) as usize % tex.h;
                world += step;

                let mut c = tex.pixels[ty * tex.w + tx];
                if fog.enabled {
                    c = color::fog_mix(c, fog.color, f);
                }
                self.scratch[row + x] = color::halve(c);
            }
            y -= 1;
        }
    }
}
